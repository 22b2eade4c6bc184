//! Flat records written to the research record store.
//!
//! Field names match the store's collections exactly, so these serialize
//! straight into request bodies.

use serde::{Deserialize, Serialize};

/// Value stored for a choice the participant never made.
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub segment: String,
    pub has_written_specs: String,
    pub vibe_coding_experience: String,
    pub consent_given: bool,
    pub consent_timestamp: String,
    pub open_to_followup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Participant record id
    pub participant: String,
    pub stimulus: String,
    pub stimulus_familiarity: String,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
}

/// Partial update of a session record. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stimulus_familiarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResponseRecord {
    /// Session record id
    pub session: String,
    pub raw_text: String,
    pub word_count: usize,
    pub time_spent_seconds: u64,
    pub hint_expanded: bool,
    pub submitted_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarifyingResponseRecord {
    pub session: String,
    /// JSON array of question ids
    pub questions_shown: String,
    /// JSON object of question id -> response
    pub responses: String,
    pub skipped: bool,
    pub submitted_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFeedbackRecord {
    pub session: String,
    /// 0 when the rating was never set
    pub difficulty_rating: u8,
    pub felt_vocabulary_gap: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary_gap_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_feedback: Option<String>,
    pub submitted_at: String,
}
