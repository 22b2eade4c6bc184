//! Tracing subscriber setup.

use std::fs::{self, File, OpenOptions};
use std::sync::Mutex;

use survey_infrastructure::{LogBuffer, SurveyPaths, TelemetryLayer};
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Opens `logs/survey.log` for appending. Logging to a file is optional,
/// so any failure just disables it.
pub fn open_log_file() -> Option<File> {
    let dir = SurveyPaths::log_dir().ok()?;
    fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("survey.log"))
        .ok()
}

/// Builds the subscriber: `RUST_LOG` (default `info`) governs the log file
/// only, while the telemetry buffer takes every level of the survey
/// categories.
pub fn subscriber(buffer: LogBuffer, log_file: Option<File>) -> impl Subscriber + Send + Sync {
    let file_layer = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(TelemetryLayer::new(buffer).with_filter(TelemetryLayer::category_filter()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use survey_core::answer::FieldUpdate;
    use survey_core::config::SurveyFeatures;
    use survey_core::flow::{SurveyController, SystemClock};
    use survey_infrastructure::TomlSnapshotRepository;
    use tempfile::TempDir;

    #[test]
    fn test_field_updates_reach_buffer_at_default_verbosity() {
        let temp_dir = TempDir::new().unwrap();
        let log_file = File::create(temp_dir.path().join("survey.log")).unwrap();
        let buffer = LogBuffer::new();

        tracing::subscriber::with_default(subscriber(buffer.clone(), Some(log_file)), || {
            let mut controller = SurveyController::new(
                SurveyFeatures::default(),
                Arc::new(TomlSnapshotRepository::with_path(
                    temp_dir.path().join("state.toml"),
                )),
                Arc::new(SystemClock),
            );
            controller.update_field(FieldUpdate::Consent(true)).unwrap();
            controller.advance().unwrap();
        });

        let entries = buffer.entries();
        let categories: Vec<&str> = entries.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(
            categories,
            vec!["survey", "form", "analytics", "navigation"]
        );
        let field = entries.iter().find(|e| e.category == "form").unwrap();
        assert_eq!(field.level, "debug");
        assert_eq!(field.data.as_ref().unwrap()["field"], "consent");
    }
}
