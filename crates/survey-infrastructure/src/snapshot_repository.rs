//! TOML-backed SnapshotRepository.

use std::path::PathBuf;

use survey_core::error::Result;
use survey_core::snapshot::{SnapshotRepository, SurveySnapshot};

use crate::paths::SurveyPaths;
use crate::storage::AtomicTomlFile;

/// Keeps the in-progress session in `state.toml`.
pub struct TomlSnapshotRepository {
    file: AtomicTomlFile<SurveySnapshot>,
}

impl TomlSnapshotRepository {
    /// Creates a repository at the default location (`<config_dir>/artifact-survey/state.toml`).
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(SurveyPaths::state_file()?))
    }

    /// Creates a repository at a custom path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }
}

impl SnapshotRepository for TomlSnapshotRepository {
    fn load(&self) -> Result<Option<SurveySnapshot>> {
        Ok(self.file.load()?)
    }

    fn save(&self, snapshot: &SurveySnapshot) -> Result<()> {
        Ok(self.file.save(snapshot)?)
    }

    fn clear(&self) -> Result<()> {
        Ok(self.file.remove()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::answer::{AnswerSet, Segment};
    use survey_core::flow::Step;
    use tempfile::TempDir;

    fn answers() -> AnswerSet {
        let mut answers = AnswerSet::new();
        answers.consent = true;
        answers.first_name = "Grace".to_string();
        answers.segment = Some(Segment::TechnicalAdjacent);
        answers
            .clarifying_responses
            .insert("views".to_string(), "A board, \"kanban\" style".to_string());
        answers.clarifying_questions_shown = vec!["views".to_string()];
        answers
    }

    #[test]
    fn test_load_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlSnapshotRepository::with_path(temp_dir.path().join("state.toml"));

        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlSnapshotRepository::with_path(temp_dir.path().join("state.toml"));
        let snapshot = SurveySnapshot::new(Step::ClarifyingQuestions, answers());

        repo.save(&snapshot).unwrap();

        let loaded = repo.load().unwrap().expect("snapshot should exist");
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.resume_step(), Step::ClarifyingQuestions);
    }

    #[test]
    fn test_identical_saves_write_identical_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");
        let repo = TomlSnapshotRepository::with_path(path.clone());
        let snapshot = SurveySnapshot::new(Step::Intake, answers());

        repo.save(&snapshot).unwrap();
        let first = std::fs::read(&path).unwrap();
        repo.save(&snapshot).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_stored_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");
        let repo = TomlSnapshotRepository::with_path(path.clone());

        repo.save(&SurveySnapshot::new(Step::Intake, answers()))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("currentStepIndex = 1"));
        assert!(content.contains("firstName = \"Grace\""));
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");
        let repo = TomlSnapshotRepository::with_path(path.clone());

        repo.clear().unwrap();

        repo.save(&SurveySnapshot::new(Step::Welcome, AnswerSet::new()))
            .unwrap();
        repo.clear().unwrap();
        assert!(!path.exists());
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_state_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");
        std::fs::write(&path, "currentStepIndex = \"three\"").unwrap();

        let repo = TomlSnapshotRepository::with_path(path);
        assert!(repo.load().is_err());
    }
}
