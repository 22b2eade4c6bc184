//! Handing a completed session to the record store.

pub mod backend;
pub mod record;
pub mod service;

pub use backend::SurveyBackend;
pub use record::{
    ClarifyingResponseRecord, IntentResponseRecord, ParticipantRecord, SessionFeedbackRecord,
    SessionRecord, SessionUpdate, UNKNOWN,
};
pub use service::{submit_survey, SubmissionOutcome, SubmissionPayload};
