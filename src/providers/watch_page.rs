//! Watch page download and `ytInitialPlayerResponse` extraction.
//!
//! Both the metadata and the transcript provider read the player response
//! embedded in `https://www.youtube.com/watch?v=<id>`.

use reqwest::header::COOKIE;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::check_status;
use crate::utils::watch_url;
use crate::ProviderError;

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

/// Pre-accepted consent cookies so EU visitors get the page instead of the consent wall
const CONSENT_COOKIE: &str = "CONSENT=YES+cb; SOCS=CAI";

/// Playability states that still carry usable metadata
const PLAYABLE_STATES: &[&str] = &["OK", "LIVE_STREAM_OFFLINE"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerResponse {
    pub playability_status: Option<PlayabilityStatus>,
    pub video_details: Option<VideoDetails>,
    pub microformat: Option<Microformat>,
    pub captions: Option<Captions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayabilityStatus {
    pub status: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoDetails {
    pub title: String,
    /// Sent as a string
    pub length_seconds: Value,
    pub short_description: String,
    pub author: String,
    /// Sent as a string
    pub view_count: Value,
    pub thumbnail: ThumbnailList,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThumbnailList {
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Microformat {
    pub player_microformat_renderer: Option<MicroformatRenderer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MicroformatRenderer {
    pub publish_date: Option<String>,
    pub upload_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Captions {
    pub player_captions_tracklist_renderer: Option<CaptionTracklist>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionTracklist {
    pub caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `"asr"` for auto-generated tracks
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

impl PlayerResponse {
    /// Fail with `VideoUnavailable` unless the video can be played
    pub fn ensure_playable(&self, video_id: &str) -> Result<(), ProviderError> {
        let Some(status) = &self.playability_status else {
            return Ok(());
        };

        if PLAYABLE_STATES.contains(&status.status.as_str()) {
            return Ok(());
        }

        Err(ProviderError::VideoUnavailable {
            video_id: video_id.to_string(),
            reason: status
                .reason
                .clone()
                .unwrap_or_else(|| status.status.clone()),
        })
    }

    pub fn caption_tracks(&self) -> &[CaptionTrack] {
        self.captions
            .as_ref()
            .and_then(|c| c.player_captions_tracklist_renderer.as_ref())
            .map(|t| t.caption_tracks.as_slice())
            .unwrap_or(&[])
    }

    /// Publish date as sent upstream, falling back to the upload date
    pub fn publish_date(&self) -> Option<&str> {
        let renderer = self
            .microformat
            .as_ref()?
            .player_microformat_renderer
            .as_ref()?;

        renderer
            .publish_date
            .as_deref()
            .or(renderer.upload_date.as_deref())
    }
}

/// Find the player response object in a watch page and deserialize it
pub fn extract_player_response(html: &str, video_id: &str) -> Result<PlayerResponse, ProviderError> {
    for (idx, _) in html.match_indices(PLAYER_RESPONSE_MARKER) {
        let rest = html[idx + PLAYER_RESPONSE_MARKER.len()..].trim_start();

        // Skip mentions like `window["ytInitialPlayerResponse"] = null`
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        if !rest.starts_with('{') {
            continue;
        }

        // The object is followed by `;var ...`, so only read the first value
        let mut values = serde_json::Deserializer::from_str(rest).into_iter::<PlayerResponse>();
        return match values.next() {
            Some(Ok(response)) => Ok(response),
            Some(Err(err)) => Err(err.into()),
            None => Err(ProviderError::PlayerResponseMissing(video_id.to_string())),
        };
    }

    Err(ProviderError::PlayerResponseMissing(video_id.to_string()))
}

/// Downloads watch pages with the shared HTTP client.
///
/// Clones share one player response per video id, so the metadata and the
/// transcript provider of an invocation read the same page state.
#[derive(Clone)]
pub struct WatchPageClient {
    http: reqwest::Client,
    responses: Arc<Mutex<HashMap<String, PlayerResponse>>>,
}

impl WatchPageClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Return the player response for a video, downloading the watch page on first use
    pub async fn fetch_player_response(&self, video_id: &str) -> Result<PlayerResponse, ProviderError> {
        let mut responses = self.responses.lock().await;
        if let Some(response) = responses.get(video_id) {
            tracing::debug!("Reusing watch page for {}", video_id);
            return Ok(response.clone());
        }

        let response = self.download(video_id).await?;
        responses.insert(video_id.to_string(), response.clone());
        Ok(response)
    }

    async fn download(&self, video_id: &str) -> Result<PlayerResponse, ProviderError> {
        let url = watch_url(video_id);
        tracing::debug!("Fetching watch page: {}", url);

        let response = self
            .http
            .get(&url)
            .header(COOKIE, CONSENT_COOKIE)
            .send()
            .await?;
        let html = check_status(response, &url)?.text().await?;

        extract_player_response(&html, video_id)
    }

    #[cfg(test)]
    pub(crate) async fn remember(&self, video_id: &str, response: PlayerResponse) {
        self.responses
            .lock()
            .await
            .insert(video_id.to_string(), response);
    }
}
