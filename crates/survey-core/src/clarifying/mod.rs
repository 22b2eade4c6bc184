//! Clarifying questions: the fixed question bank and the dimension analyzer.

pub mod analyzer;
pub mod model;

pub use analyzer::{analyze, covers, has_missing_dimensions, MAX_QUESTIONS};
pub use model::{ClarifyingQuestion, Dimension, QUESTION_BANK};
