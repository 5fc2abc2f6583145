use async_trait::async_trait;

use super::watch_page::{PlayerResponse, WatchPageClient};
use super::{MetadataProvider, VideoMetadata};
use crate::utils::{normalize_publish_date, parse_count};
use crate::ProviderError;

/// Metadata read from the public watch page, no API key needed
pub struct WatchPageMetadataProvider {
    page: WatchPageClient,
}

impl WatchPageMetadataProvider {
    pub fn new(page: WatchPageClient) -> Self {
        Self { page }
    }
}

/// Map a player response onto `VideoMetadata`
pub fn metadata_from_player_response(
    video_id: &str,
    response: &PlayerResponse,
) -> Result<VideoMetadata, ProviderError> {
    response.ensure_playable(video_id)?;

    let details = response
        .video_details
        .as_ref()
        .ok_or_else(|| ProviderError::VideoNotFound(video_id.to_string()))?;

    let length = parse_count(&details.length_seconds).ok_or_else(|| {
        ProviderError::Parse(format!("lengthSeconds is not a number: {}", details.length_seconds))
    })?;

    // Premieres and some live streams have no view count yet
    let views = parse_count(&details.view_count).unwrap_or(0);

    let thumbnail_url = details
        .thumbnail
        .thumbnails
        .last()
        .map(|t| t.url.clone())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id));

    Ok(VideoMetadata {
        id: video_id.to_string(),
        title: details.title.clone(),
        description: details.short_description.clone(),
        author: details.author.clone(),
        length,
        publish_date: normalize_publish_date(response.publish_date()),
        views,
        thumbnail_url,
    })
}

#[async_trait]
impl MetadataProvider for WatchPageMetadataProvider {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, ProviderError> {
        let response = self.page.fetch_player_response(video_id).await?;
        metadata_from_player_response(video_id, &response)
    }

    fn provider_name(&self) -> &'static str {
        "YouTube watch page"
    }
}
