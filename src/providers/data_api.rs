use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{check_status, MetadataProvider, VideoMetadata};
use crate::utils::{normalize_publish_date, parse_count, parse_iso8601_duration};
use crate::ProviderError;

pub const DATA_API_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Metadata from the YouTube Data API v3
pub struct DataApiMetadataProvider {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoListResponse {
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoItem {
    pub snippet: Snippet,
    pub content_details: ContentDetails,
    pub statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snippet {
    pub published_at: Option<String>,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Thumbnails {
    pub default: Option<ThumbnailRef>,
    pub medium: Option<ThumbnailRef>,
    pub high: Option<ThumbnailRef>,
    pub standard: Option<ThumbnailRef>,
    pub maxres: Option<ThumbnailRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThumbnailRef {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContentDetails {
    pub duration: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    pub view_count: serde_json::Value,
}

impl Thumbnails {
    /// Largest available thumbnail
    pub fn best(&self) -> Option<&str> {
        [&self.maxres, &self.standard, &self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.as_str())
            .find(|url| !url.is_empty())
    }
}

impl DataApiMetadataProvider {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            endpoint: DATA_API_ENDPOINT.to_string(),
        }
    }

    fn request_url(&self, video_id: &str) -> Result<Url, ProviderError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("part", "snippet,contentDetails,statistics"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| ProviderError::Parse(format!("invalid Data API endpoint: {}", e)))
    }
}

/// Map a `videos.list` response onto `VideoMetadata`
pub fn metadata_from_video_list(
    video_id: &str,
    response: VideoListResponse,
) -> Result<VideoMetadata, ProviderError> {
    let item = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::VideoNotFound(video_id.to_string()))?;

    let length = parse_iso8601_duration(&item.content_details.duration).ok_or_else(|| {
        ProviderError::Parse(format!(
            "unrecognized duration: {:?}",
            item.content_details.duration
        ))
    })?;

    let thumbnail_url = item
        .snippet
        .thumbnails
        .best()
        .map(str::to_string)
        .unwrap_or_else(|| format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id));

    Ok(VideoMetadata {
        id: video_id.to_string(),
        title: item.snippet.title,
        description: item.snippet.description,
        author: item.snippet.channel_title,
        length,
        publish_date: normalize_publish_date(item.snippet.published_at.as_deref()),
        // Hidden when the owner disables public stats
        views: parse_count(&item.statistics.view_count).unwrap_or(0),
        thumbnail_url,
    })
}

#[async_trait]
impl MetadataProvider for DataApiMetadataProvider {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, ProviderError> {
        let url = self.request_url(video_id)?;
        tracing::debug!("Querying Data API for {}", video_id);

        // The query string carries the API key, keep it out of errors
        let response = self.http.get(url).send().await.map_err(|e| e.without_url())?;
        let body: VideoListResponse = check_status(response, &self.endpoint)?
            .json()
            .await
            .map_err(|e| e.without_url())?;

        metadata_from_video_list(video_id, body)
    }

    fn provider_name(&self) -> &'static str {
        "YouTube Data API"
    }
}
