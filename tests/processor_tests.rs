//! End-to-end processing with in-memory providers

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use video_processor::output::write_json_line;
use video_processor::{
    MetadataProvider, ProcessError, ProviderError, TranscriptProvider, TranscriptResult,
    TranscriptSegment, VideoMetadata, VideoProcessor,
};

struct FakeMetadata {
    fail: bool,
}

#[async_trait]
impl MetadataProvider for FakeMetadata {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, ProviderError> {
        if self.fail {
            return Err(ProviderError::Status {
                status: 404,
                url: format!("https://www.youtube.com/watch?v={}", video_id),
            });
        }
        Ok(VideoMetadata {
            id: video_id.to_string(),
            title: "A talk".to_string(),
            description: "About things".to_string(),
            author: "Speaker".to_string(),
            length: 125,
            publish_date: "2021-06-01 00:00:00".to_string(),
            views: 9001,
            thumbnail_url: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake metadata"
    }
}

struct FakeTranscript {
    texts: Vec<&'static str>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TranscriptProvider for FakeTranscript {
    async fn fetch_transcript(&self, video_id: &str) -> Result<TranscriptResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let segments = self
            .texts
            .iter()
            .enumerate()
            .map(|(i, text)| TranscriptSegment {
                text: text.to_string(),
                start: i as f64 * 2.0,
                duration: 2.0,
            })
            .collect();
        Ok(TranscriptResult::new(video_id, segments))
    }

    fn provider_name(&self) -> &'static str {
        "fake transcript"
    }
}

fn processor(fail_metadata: bool, texts: Vec<&'static str>) -> (VideoProcessor, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let processor = VideoProcessor::new(
        Box::new(FakeMetadata {
            fail: fail_metadata,
        }),
        Box::new(FakeTranscript {
            texts,
            calls: Arc::clone(&calls),
        }),
    );
    (processor, calls)
}

async fn render(processor: &VideoProcessor, video_id: &str) -> String {
    let result = processor.process(video_id).await.unwrap();
    let mut buffer = Vec::new();
    write_json_line(&mut buffer, &result).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[tokio::test]
async fn combined_document_has_metadata_and_transcript() {
    let (processor, calls) = processor(false, vec!["Hi", "there"]);
    let line = render(&processor, "dQw4w9WgXcQ").await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(line.lines().count(), 1);

    let value: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value.as_object().unwrap().len(), 2);
    assert_eq!(value["metadata"]["id"], "dQw4w9WgXcQ");
    assert_eq!(value["metadata"]["length"], 125);
    assert_eq!(value["transcript"]["id"], "dQw4w9WgXcQ");
    assert_eq!(value["transcript"]["full_text"], "Hi there");
    assert_eq!(value["transcript"]["transcript"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    let (processor, _) = processor(false, vec!["one", "two", "three"]);
    let first = render(&processor, "dQw4w9WgXcQ").await;
    let second = render(&processor, "dQw4w9WgXcQ").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn metadata_failure_stops_before_transcript() {
    let (processor, calls) = processor(true, vec!["unused"]);
    let err = processor.process("dQw4w9WgXcQ").await.unwrap_err();

    assert!(matches!(err, ProcessError::Metadata(ProviderError::Status { status: 404, .. })));
    assert!(err.to_string().starts_with("Error fetching metadata: HTTP 404"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_transcript_is_a_valid_result() {
    let (processor, _) = processor(false, Vec::new());
    let value: Value = serde_json::from_str(&render(&processor, "dQw4w9WgXcQ").await).unwrap();

    assert_eq!(value["transcript"]["full_text"], "");
    assert!(value["transcript"]["transcript"].as_array().unwrap().is_empty());
}
