use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use serde::{Deserialize, Serialize};

pub mod data_api;
pub mod timedtext;
pub mod watch_page;
pub mod youtube;

use crate::config::HttpConfig;
use crate::ProviderError;

/// Metadata describing a single video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Video id, identical to the requested id
    pub id: String,

    pub title: String,

    /// Full description, possibly empty
    pub description: String,

    /// Channel name
    pub author: String,

    /// Duration in seconds
    pub length: u64,

    /// `YYYY-MM-DD HH:MM:SS`, empty if unknown
    pub publish_date: String,

    /// View count
    pub views: u64,

    pub thumbnail_url: String,
}

/// One timed caption entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// Transcript of a video with its segments in upstream order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub id: String,

    #[serde(rename = "transcript")]
    pub segments: Vec<TranscriptSegment>,

    /// Segment texts joined by single spaces
    pub full_text: String,
}

impl TranscriptResult {
    /// Build a result, deriving `full_text` from the segments
    pub fn new(id: impl Into<String>, segments: Vec<TranscriptSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id: id.into(),
            segments,
            full_text,
        }
    }
}

/// Source of video metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch metadata for a video id
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, ProviderError>;

    /// Get the name of this provider
    fn provider_name(&self) -> &'static str;
}

/// Source of video transcripts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the default transcript for a video id
    async fn fetch_transcript(&self, video_id: &str) -> Result<TranscriptResult, ProviderError>;

    /// Get the name of this provider
    fn provider_name(&self) -> &'static str;
}

/// Build the HTTP client shared by all providers of one invocation
pub fn build_http_client(config: &HttpConfig) -> crate::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language)
            .context("http.accept_language is not a valid header value")?,
    );

    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

/// Turn a non-success response into a `ProviderError::Status`
pub(crate) fn check_status(
    response: reqwest::Response,
    display_url: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            url: display_url.to_string(),
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, start: f64) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            start,
            duration: 1.0,
        }
    }

    #[test]
    fn test_full_text_joins_in_order() {
        let result = TranscriptResult::new("abc", vec![segment("Hi", 0.0), segment("there", 1.0)]);
        assert_eq!(result.full_text, "Hi there");
        assert_eq!(result.segments[0].text, "Hi");
    }

    #[test]
    fn test_full_text_keeps_upstream_order() {
        // Upstream order wins even when offsets are not sorted
        let result = TranscriptResult::new("abc", vec![segment("b", 5.0), segment("a", 0.0)]);
        assert_eq!(result.full_text, "b a");
    }

    #[test]
    fn test_empty_transcript_is_valid() {
        let result = TranscriptResult::new("abc", Vec::new());
        assert!(result.segments.is_empty());
        assert_eq!(result.full_text, "");
    }

    #[test]
    fn test_transcript_json_shape() {
        let result = TranscriptResult::new("abc", vec![segment("Hi", 0.5)]);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["transcript"][0]["text"], "Hi");
        assert_eq!(value["transcript"][0]["start"], 0.5);
        assert_eq!(value["full_text"], "Hi");
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());

        let config = HttpConfig {
            accept_language: "bad\nvalue".to_string(),
            ..HttpConfig::default()
        };
        assert!(build_http_client(&config).is_err());
    }

    fn response(status: u16) -> reqwest::Response {
        reqwest::Response::from(http::Response::builder().status(status).body("").unwrap())
    }

    #[test]
    fn test_check_status_maps_error_status() {
        let url = "https://www.youtube.com/watch?v=abcdefghijk";
        let err = check_status(response(404), url).unwrap_err();

        assert!(matches!(&err, ProviderError::Status { status: 404, url: u } if u == url));
        assert_eq!(err.to_string(), format!("HTTP 404 from {}", url));
    }

    #[test]
    fn test_check_status_passes_success_through() {
        let passed = check_status(response(200), "https://www.youtube.com").unwrap();
        assert_eq!(passed.status().as_u16(), 200);

        assert!(check_status(response(429), "x").is_err());
    }
}
