//! Client configuration file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub download_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub error_display_secs: u64,
    pub device_pixel_ratio: f32,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            download_dir: PathBuf::from("."),
            request_timeout_secs: 120,
            error_display_secs: 5,
            device_pixel_ratio: 2.0,
            log_file: PathBuf::from("visit-report.log"),
        }
    }
}

impl Config {
    /// Loads `path`, or the default location when `None`. A missing file
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| ClientError::Config(e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ClientResult<Self> {
        toml::from_str(content).map_err(|e| ClientError::Config(e.to_string()))
    }

    fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".visit-report").join("config.toml"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_secs(self.error_display_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("base_url = \"https://forms.example.org\"\nerror_display_secs = 8\n").unwrap();
        assert_eq!(config.base_url, "https://forms.example.org");
        assert_eq!(config.error_display(), Duration::from_secs(8));
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.device_pixel_ratio, 2.0);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        assert!(matches!(
            Config::from_toml("request_timeout_secs = \"soon\""),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "download_dir = \"/tmp/reports\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.download_dir, PathBuf::from("/tmp/reports"));
    }
}
