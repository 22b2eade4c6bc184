//! Persistence collaborator trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::submission::record::{
    ClarifyingResponseRecord, IntentResponseRecord, ParticipantRecord, SessionFeedbackRecord,
    SessionRecord, SessionUpdate,
};

/// The hosted record store survey results are written to.
///
/// Every `create_*` call returns the identifier the store assigned.
/// There is no transaction spanning calls.
#[async_trait]
pub trait SurveyBackend: Send + Sync {
    /// Health probe. `false` means submission should not be attempted.
    async fn check_connection(&self) -> bool;

    async fn create_participant(&self, record: ParticipantRecord) -> Result<String>;

    async fn create_session(&self, record: SessionRecord) -> Result<String>;

    async fn update_session(&self, id: &str, update: SessionUpdate) -> Result<String>;

    async fn create_intent_response(&self, record: IntentResponseRecord) -> Result<String>;

    async fn create_clarifying_response(&self, record: ClarifyingResponseRecord)
    -> Result<String>;

    async fn create_session_feedback(&self, record: SessionFeedbackRecord) -> Result<String>;
}
