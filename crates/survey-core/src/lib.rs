pub mod answer;
pub mod clarifying;
pub mod config;
pub mod error;
pub mod flow;
pub mod snapshot;
pub mod submission;

// Re-export common error type
pub use error::SurveyError;

pub use flow::{Step, SurveyController};
