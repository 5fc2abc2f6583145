use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "process_video",
    about = "Fetch a YouTube video's metadata and transcript as a single JSON document",
    version,
    long_about = "Fetches the metadata and the default transcript of a YouTube video and prints both as one line of JSON on standard output. Diagnostics go to standard error."
)]
pub struct Cli {
    /// Video id (or a YouTube watch/share URL)
    #[arg(value_name = "VIDEO_ID", value_parser = parse_video_id)]
    pub video_id: String,

    /// Configuration file (defaults to ./config.yaml, then the user config directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Preferred transcript language; repeat to give a fallback order
    #[arg(short, long = "lang", value_name = "CODE")]
    pub languages: Vec<String>,

    /// Where video metadata comes from
    #[arg(long, value_enum, value_name = "BACKEND")]
    pub metadata_backend: Option<MetadataBackend>,

    /// YouTube Data API key, required by the data-api backend
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Enable verbose logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_video_id(raw: &str) -> Result<String, String> {
    crate::utils::normalize_video_id(raw).map_err(|e| e.to_string())
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataBackend {
    /// Parse the public watch page
    #[default]
    WatchPage,
    /// YouTube Data API v3
    DataApi,
}

impl std::fmt::Display for MetadataBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataBackend::WatchPage => write!(f, "watch-page"),
            MetadataBackend::DataApi => write!(f, "data-api"),
        }
    }
}
