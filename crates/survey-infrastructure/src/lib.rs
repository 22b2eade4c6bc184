pub mod config_service;
pub mod paths;
pub mod pocketbase_backend;
pub mod snapshot_repository;
pub mod storage;
pub mod telemetry;

pub use crate::config_service::{SettingsService, SurveySettings};
pub use crate::paths::SurveyPaths;
pub use crate::pocketbase_backend::PocketBaseBackend;
pub use crate::snapshot_repository::TomlSnapshotRepository;
pub use crate::telemetry::{LogBuffer, LogEntry, TelemetryLayer};
