//! Video Processor - fetch a YouTube video's metadata and transcript as one JSON document
//!
//! This library provides the provider abstractions, the production YouTube providers
//! and the orchestration used by the `process_video` binary.

pub mod cli;
pub mod config;
pub mod output;
pub mod processor;
pub mod providers;
pub mod utils;

pub use cli::{Cli, MetadataBackend};
pub use config::Config;
pub use processor::{CombinedResult, ProcessError, VideoProcessor};
pub use providers::{
    MetadataProvider, TranscriptProvider, TranscriptResult, TranscriptSegment, VideoMetadata,
};

/// Result type used by the application plumbing
pub type Result<T> = anyhow::Result<T>;

/// Errors raised by metadata and transcript providers
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Could not find player response in watch page for {0}")]
    PlayerResponseMissing(String),

    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("Failed to parse provider response: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(err.to_string())
    }
}
