//! Runtime settings.
//!
//! Settings live in `~/.config/artifact-survey/config.toml`, which is
//! written with defaults on first run. A few values can be overridden from
//! the environment so a deployment can point at a different record store
//! without touching the file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use survey_core::error::Result;

use crate::paths::SurveyPaths;
use crate::storage::AtomicTomlFile;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8090";
pub const DEFAULT_SURVEY_ID: &str = "document-structure-ia";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const ENV_BACKEND_URL: &str = "SURVEY_BACKEND_URL";
pub const ENV_SURVEY_ID: &str = "SURVEY_ID";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySettings {
    #[serde(default = "default_survey_id")]
    pub survey_id: String,
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Overrides the default snapshot location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

fn default_survey_id() -> String {
    DEFAULT_SURVEY_ID.to_string()
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            survey_id: default_survey_id(),
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            snapshot_path: None,
        }
    }
}

impl SurveySettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Applies environment overrides. Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank(ENV_BACKEND_URL) {
            self.backend_url = url;
        }
        if let Some(id) = non_blank(ENV_SURVEY_ID) {
            self.survey_id = id;
        }
        self
    }
}

/// Loads `SurveySettings` from disk.
pub struct SettingsService {
    file: AtomicTomlFile<SurveySettings>,
}

impl SettingsService {
    /// Uses the default config file location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(SurveyPaths::config_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Reads the settings file, creating it with defaults when missing, then
    /// applies environment overrides.
    pub fn load(&self) -> Result<SurveySettings> {
        let settings = match self.file.load()? {
            Some(settings) => settings,
            None => {
                let defaults = SurveySettings::default();
                if let Err(e) = self.file.save(&defaults) {
                    tracing::warn!(
                        target: "survey",
                        path = %self.file.path().display(),
                        error = %e,
                        "Failed to write default settings"
                    );
                }
                defaults
            }
        };

        Ok(settings.with_overrides(|key| std::env::var(key).ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = SettingsService::with_path(path.clone());

        let settings = service.load().unwrap();

        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(path.exists());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("backend_url"));
    }

    #[test]
    fn test_partial_file_uses_defaults_for_the_rest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = 3\n").unwrap();

        let settings = SettingsService::with_path(path).load().unwrap();

        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert!(settings.snapshot_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = SurveySettings::default().with_overrides(|key| match key {
            ENV_BACKEND_URL => Some("https://records.example.org".to_string()),
            ENV_SURVEY_ID => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(settings.backend_url, "https://records.example.org");
        assert_eq!(settings.survey_id, DEFAULT_SURVEY_ID);
    }
}
