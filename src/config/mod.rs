use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Cli, MetadataBackend};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP client settings
    pub http: HttpConfig,

    /// Metadata provider settings
    pub metadata: MetadataConfig,

    /// Transcript provider settings
    pub transcript: TranscriptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent sent to YouTube
    pub user_agent: String,

    /// Accept-Language sent to YouTube, controls the language of page metadata
    pub accept_language: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Which metadata provider to use
    pub backend: MetadataBackend,

    /// YouTube Data API key
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Preferred caption languages, in order
    pub languages: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("video-processor/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, or from the default locations.
    ///
    /// A missing default file is not an error; an explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        let config = match path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        Ok(config)
    }

    /// Read and parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        serde_yaml::from_str(&content).context("Failed to parse config file")
    }

    /// Get configuration file path
    fn default_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("video-processor").join("config.yaml"))
    }

    /// Apply command line overrides on top of the file values
    pub fn apply_cli(&mut self, cli: &Cli) {
        if !cli.languages.is_empty() {
            self.transcript.languages = cli.languages.clone();
        }
        if let Some(backend) = cli.metadata_backend {
            self.metadata.backend = backend;
        }
        if let Some(key) = &cli.api_key {
            self.metadata.api_key = Some(key.clone());
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            anyhow::bail!("http.timeout_secs must be greater than zero");
        }

        if self.transcript.languages.iter().all(|l| l.trim().is_empty()) {
            anyhow::bail!("transcript.languages must contain at least one language code");
        }

        if self.metadata.backend == MetadataBackend::DataApi
            && self.metadata.api_key.as_deref().map_or(true, str::is_empty)
        {
            anyhow::bail!(
                "The data-api metadata backend needs an API key (--api-key or YOUTUBE_API_KEY)"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.metadata.backend, MetadataBackend::WatchPage);
        assert_eq!(config.transcript.languages, vec!["en"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "transcript:\n  languages: [de, en]\nhttp:\n  timeout_secs: 5").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.transcript.languages, vec!["de", "en"]);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.accept_language, "en-US,en;q=0.9");
        assert_eq!(config.metadata.backend, MetadataBackend::WatchPage);
    }

    #[test]
    fn test_backend_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "metadata:\n  backend: data_api\n  api_key: abc").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.metadata.backend, MetadataBackend::DataApi);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_data_api_requires_key() {
        let mut config = Config::default();
        config.metadata.backend = MetadataBackend::DataApi;
        assert!(config.validate().is_err());

        config.metadata.api_key = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "process_video",
            "-l",
            "fr",
            "--metadata-backend",
            "data-api",
            "--api-key",
            "k",
            "dQw4w9WgXcQ",
        ])
        .unwrap();

        let mut config = Config::default();
        config.apply_cli(&cli);
        assert_eq!(config.transcript.languages, vec!["fr"]);
        assert_eq!(config.metadata.backend, MetadataBackend::DataApi);
        assert_eq!(config.metadata.api_key.as_deref(), Some("k"));
        assert!(config.validate().is_ok());
    }
}
