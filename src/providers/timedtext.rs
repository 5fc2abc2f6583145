use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::watch_page::{CaptionTrack, WatchPageClient};
use super::{check_status, TranscriptProvider, TranscriptResult, TranscriptSegment};
use crate::ProviderError;

/// Transcript from the caption tracks listed in the watch page
pub struct TimedTextTranscriptProvider {
    page: WatchPageClient,
    http: reqwest::Client,
    languages: Vec<String>,
}

/// `fmt=json3` timedtext payload
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Json3Transcript {
    events: Vec<Json3Event>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Json3Event {
    t_start_ms: u64,
    d_duration_ms: u64,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Json3Seg {
    utf8: String,
}

impl TimedTextTranscriptProvider {
    /// `page` should be shared with the metadata provider so the watch page is fetched once
    pub fn new(page: WatchPageClient, http: reqwest::Client, languages: Vec<String>) -> Self {
        Self {
            page,
            http,
            languages,
        }
    }
}

/// Pick a caption track.
///
/// Preferred languages are tried in order, a manual track beating an
/// auto-generated one of the same language. Without a match the first
/// listed track is used.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    for language in languages {
        let mut matching = tracks
            .iter()
            .filter(|track| track.language_code.eq_ignore_ascii_case(language));

        let manual = matching.clone().find(|track| !track.is_generated());
        if let Some(track) = manual.or_else(|| matching.next()) {
            return Some(track);
        }
    }

    tracks.first()
}

/// Caption URL with `fmt=json3` in place of any format the base URL carries
pub fn json3_url(base_url: &str) -> Result<Url, ProviderError> {
    let base = Url::parse("https://www.youtube.com")
        .and_then(|root| root.join(base_url))
        .map_err(|e| ProviderError::Parse(format!("invalid caption url {}: {}", base_url, e)))?;

    let pairs: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base;
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");

    Ok(url)
}

/// Turn a json3 payload into segments, dropping events without text
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptSegment>, ProviderError> {
    if body.trim().is_empty() {
        return Err(ProviderError::Parse("empty caption response".to_string()));
    }

    let transcript: Json3Transcript = serde_json::from_str(body)?;

    let segments = transcript
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs?.into_iter().map(|seg| seg.utf8).collect();
            if text.trim().is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                text,
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    Ok(segments)
}

#[async_trait]
impl TranscriptProvider for TimedTextTranscriptProvider {
    async fn fetch_transcript(&self, video_id: &str) -> Result<TranscriptResult, ProviderError> {
        let player = self.page.fetch_player_response(video_id).await?;
        player.ensure_playable(video_id)?;

        let track = select_track(player.caption_tracks(), &self.languages)
            .ok_or_else(|| ProviderError::TranscriptsDisabled(video_id.to_string()))?;
        tracing::debug!(
            language = %track.language_code,
            generated = track.is_generated(),
            "Selected caption track"
        );

        let url = json3_url(&track.base_url)?;
        let display_url = format!("{}{}", url.origin().ascii_serialization(), url.path());
        tracing::debug!("Fetching captions: {}", display_url);

        let response = self.http.get(url).send().await?;
        let body = check_status(response, &display_url)?.text().await?;

        let segments = parse_json3(&body)?;
        tracing::info!("Fetched {} transcript segments", segments.len());

        Ok(TranscriptResult::new(video_id, segments))
    }

    fn provider_name(&self) -> &'static str {
        "YouTube timedtext"
    }
}
