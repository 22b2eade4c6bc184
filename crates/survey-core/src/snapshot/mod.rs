//! Durable local snapshot of the session in progress.

pub mod model;
pub mod repository;

pub use model::SurveySnapshot;
pub use repository::SnapshotRepository;
