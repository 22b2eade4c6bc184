//! Durable local snapshot of an in-progress session.

use serde::{Deserialize, Serialize};

use crate::answer::AnswerSet;
use crate::flow::step::Step;

/// What is kept on disk so an interrupted session can be resumed.
///
/// Scalars come before the nested answer table so the TOML form stays flat
/// at the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySnapshot {
    pub current_step_index: usize,
    #[serde(default)]
    pub answers: AnswerSet,
}

impl SurveySnapshot {
    pub fn new(step: Step, answers: AnswerSet) -> Self {
        Self {
            current_step_index: step.index(),
            answers,
        }
    }

    /// The step to resume on. A snapshot pointing at or past the terminal
    /// step resumes from the beginning.
    pub fn resume_step(&self) -> Step {
        match Step::from_index(self.current_step_index) {
            Some(step) if !step.is_terminal() => step,
            _ => Step::FIRST,
        }
    }
}
