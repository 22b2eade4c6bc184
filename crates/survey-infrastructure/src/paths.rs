//! Where the survey keeps its files.
//!
//! ```text
//! ~/.config/artifact-survey/   # Config directory (platform equivalent elsewhere)
//! ├── config.toml              # SurveySettings
//! ├── state.toml               # In-progress session snapshot
//! └── logs/
//!     └── survey.log
//! ```

use std::path::PathBuf;

use survey_core::SurveyError;

const APP_DIR: &str = "artifact-survey";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// No platform config directory could be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for SurveyError {
    fn from(e: PathError) -> Self {
        SurveyError::config(e.to_string())
    }
}

pub struct SurveyPaths;

impl SurveyPaths {
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn state_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("state.toml"))
    }

    pub fn log_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}
