use serde::{Deserialize, Serialize};

use crate::cli::MetadataBackend;
use crate::config::Config;
use crate::providers::data_api::DataApiMetadataProvider;
use crate::providers::timedtext::TimedTextTranscriptProvider;
use crate::providers::watch_page::WatchPageClient;
use crate::providers::youtube::WatchPageMetadataProvider;
use crate::providers::{
    build_http_client, MetadataProvider, TranscriptProvider, TranscriptResult, VideoMetadata,
};
use crate::ProviderError;

/// Metadata and transcript of one video, serialized as the tool's output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub metadata: VideoMetadata,
    pub transcript: TranscriptResult,
}

/// Which stage of processing failed
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("Error fetching metadata: {0}")]
    Metadata(ProviderError),

    #[error("Error fetching transcript: {0}")]
    Transcript(ProviderError),
}

/// Runs the metadata and transcript fetches for a video, one after the other
pub struct VideoProcessor {
    metadata: Box<dyn MetadataProvider>,
    transcript: Box<dyn TranscriptProvider>,
}

impl VideoProcessor {
    pub fn new(metadata: Box<dyn MetadataProvider>, transcript: Box<dyn TranscriptProvider>) -> Self {
        Self {
            metadata,
            transcript,
        }
    }

    /// Build the production providers selected by the configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let http = build_http_client(&config.http)?;
        let page = WatchPageClient::new(http.clone());

        let metadata: Box<dyn MetadataProvider> = match config.metadata.backend {
            MetadataBackend::WatchPage => Box::new(WatchPageMetadataProvider::new(page.clone())),
            MetadataBackend::DataApi => {
                let key = config
                    .metadata
                    .api_key
                    .clone()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("The data-api metadata backend needs an API key"))?;
                Box::new(DataApiMetadataProvider::new(http.clone(), key))
            }
        };

        let transcript = Box::new(TimedTextTranscriptProvider::new(
            page,
            http,
            config.transcript.languages.clone(),
        ));

        Ok(Self::new(metadata, transcript))
    }

    /// Fetch metadata, then the transcript.
    ///
    /// The transcript provider is not called when the metadata fetch fails.
    pub async fn process(&self, video_id: &str) -> Result<CombinedResult, ProcessError> {
        tracing::info!(
            "Fetching metadata for {} from {}",
            video_id,
            self.metadata.provider_name()
        );
        let metadata = self
            .metadata
            .fetch_metadata(video_id)
            .await
            .map_err(ProcessError::Metadata)?;

        tracing::info!(
            "Fetching transcript for {} from {}",
            video_id,
            self.transcript.provider_name()
        );
        let transcript = self
            .transcript
            .fetch_transcript(video_id)
            .await
            .map_err(ProcessError::Transcript)?;

        Ok(CombinedResult {
            metadata,
            transcript,
        })
    }
}
