//! Answer Set domain models.
//!
//! Choice enums serialize to the exact strings stored by the research
//! record store, so they round-trip unchanged through snapshots and
//! backend records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Participant segment chosen on the intake screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString)]
pub enum Segment {
    #[serde(rename = "Technical-adjacent")]
    #[strum(serialize = "Technical-adjacent")]
    TechnicalAdjacent,
    #[serde(rename = "Non-technical")]
    #[strum(serialize = "Non-technical")]
    NonTechnical,
    Engineer,
    Other,
}

impl Segment {
    pub fn label(self) -> &'static str {
        match self {
            Segment::TechnicalAdjacent => "Technical-adjacent (PM, BA, Designer)",
            Segment::NonTechnical => "Non-technical (Business owner, Creator)",
            Segment::Engineer => "Software Engineer / Developer",
            Segment::Other => "Other",
        }
    }
}

/// How often the participant has written a specification before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString)]
pub enum SpecExperience {
    Regularly,
    Occasionally,
    #[serde(rename = "Rarely / Never")]
    #[strum(serialize = "Rarely / Never")]
    RarelyNever,
}

impl SpecExperience {
    pub fn label(self) -> &'static str {
        match self {
            SpecExperience::Regularly => "Regularly",
            SpecExperience::Occasionally => "Occasionally",
            SpecExperience::RarelyNever => "Rarely / Never",
        }
    }
}

/// Experience with AI app builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString)]
pub enum VibeCodingExperience {
    Extensive,
    Little,
    KnowNotUsed,
    DontKnow,
}

impl VibeCodingExperience {
    pub fn label(self) -> &'static str {
        match self {
            VibeCodingExperience::Extensive => "Extensive experience",
            VibeCodingExperience::Little => "Tried it a little",
            VibeCodingExperience::KnowNotUsed => "Know of them, haven't used",
            VibeCodingExperience::DontKnow => "Don't know what this is",
        }
    }
}

/// Familiarity with the kind of app described by the stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString)]
pub enum StimulusFamiliarity {
    #[serde(rename = "Very familiar (I use one regularly)")]
    #[strum(serialize = "Very familiar (I use one regularly)")]
    VeryFamiliar,
    #[serde(rename = "Somewhat familiar")]
    #[strum(serialize = "Somewhat familiar")]
    SomewhatFamiliar,
    #[serde(rename = "Not very familiar")]
    #[strum(serialize = "Not very familiar")]
    NotVeryFamiliar,
}

/// Whether the participant felt they lacked words to describe the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString)]
pub enum VocabGap {
    Yes,
    No,
    Unsure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString)]
pub enum YesNo {
    Yes,
    No,
}

/// Stimulus shown when none has been chosen explicitly.
pub const DEFAULT_STIMULUS: &str = "todo_app";

fn default_stimulus() -> String {
    DEFAULT_STIMULUS.to_string()
}

/// Everything the participant has supplied during one session.
///
/// Every field starts empty or absent. Fields are only written through
/// [`crate::answer::FieldUpdate`], which ties each field to the step that
/// owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSet {
    // ============================================================================
    // Welcome
    // ============================================================================
    #[serde(default)]
    pub consent: bool,

    // ============================================================================
    // Intake
    // ============================================================================
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_written_specs: Option<SpecExperience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibe_coding_experience: Option<VibeCodingExperience>,

    // ============================================================================
    // Stimulus
    // ============================================================================
    #[serde(default = "default_stimulus")]
    pub stimulus: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stimulus_familiarity: Option<StimulusFamiliarity>,

    // ============================================================================
    // Intent capture
    // ============================================================================
    #[serde(default)]
    pub intent_description: String,
    #[serde(default)]
    pub hint_expanded: bool,

    // ============================================================================
    // Clarifying questions
    // ============================================================================
    /// Question id -> free-text response
    #[serde(default)]
    pub clarifying_responses: BTreeMap<String, String>,
    #[serde(default)]
    pub clarifying_skipped: bool,
    #[serde(default)]
    pub clarifying_questions_shown: Vec<String>,

    // ============================================================================
    // Reflection
    // ============================================================================
    /// 1-5, mandatory before submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab_gap: Option<VocabGap>,
    #[serde(default)]
    pub difficulty_description: String,
    #[serde(default)]
    pub other_thoughts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_interest: Option<YesNo>,
    #[serde(default)]
    pub email: String,
}

impl Default for AnswerSet {
    fn default() -> Self {
        Self {
            consent: false,
            first_name: String::new(),
            segment: None,
            has_written_specs: None,
            vibe_coding_experience: None,
            stimulus: default_stimulus(),
            stimulus_familiarity: None,
            intent_description: String::new(),
            hint_expanded: false,
            clarifying_responses: BTreeMap::new(),
            clarifying_skipped: false,
            clarifying_questions_shown: Vec::new(),
            difficulty_rating: None,
            vocab_gap: None,
            difficulty_description: String::new(),
            other_thoughts: String::new(),
            follow_up_interest: None,
            email: String::new(),
        }
    }
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whitespace-separated words in the trimmed intent description.
    pub fn word_count(&self) -> usize {
        self.intent_description.split_whitespace().count()
    }

    /// Number of clarifying responses with non-blank text.
    pub fn answered_clarifying_count(&self) -> usize {
        self.clarifying_responses
            .values()
            .filter(|v| !v.trim().is_empty())
            .count()
    }
}
