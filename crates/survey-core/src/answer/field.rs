//! Single-field updates to the Answer Set.

use serde_json::{json, Value};

use super::model::{
    AnswerSet, Segment, SpecExperience, StimulusFamiliarity, VibeCodingExperience, VocabGap, YesNo,
};
use crate::error::{Result, SurveyError};
use crate::flow::step::Step;

/// Allowed difficulty ratings.
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// A single-field mutation issued by the active screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Consent(bool),

    FirstName(String),
    Segment(Segment),
    SpecExperience(SpecExperience),
    VibeCodingExperience(VibeCodingExperience),

    Stimulus(String),
    StimulusFamiliarity(StimulusFamiliarity),

    IntentDescription(String),
    HintExpanded(bool),

    ClarifyingResponse { question_id: String, text: String },
    ClarifyingSkipped(bool),

    DifficultyRating(Option<u8>),
    VocabGap(VocabGap),
    DifficultyDescription(String),
    OtherThoughts(String),
    FollowUpInterest(YesNo),
    Email(String),
}

impl FieldUpdate {
    /// Name of the field as stored in the Answer Set.
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldUpdate::Consent(_) => "consent",
            FieldUpdate::FirstName(_) => "firstName",
            FieldUpdate::Segment(_) => "segment",
            FieldUpdate::SpecExperience(_) => "hasWrittenSpecs",
            FieldUpdate::VibeCodingExperience(_) => "vibeCodingExperience",
            FieldUpdate::Stimulus(_) => "stimulus",
            FieldUpdate::StimulusFamiliarity(_) => "stimulusFamiliarity",
            FieldUpdate::IntentDescription(_) => "intentDescription",
            FieldUpdate::HintExpanded(_) => "hintExpanded",
            FieldUpdate::ClarifyingResponse { .. } => "clarifyingResponses",
            FieldUpdate::ClarifyingSkipped(_) => "clarifyingSkipped",
            FieldUpdate::DifficultyRating(_) => "difficultyRating",
            FieldUpdate::VocabGap(_) => "vocabGap",
            FieldUpdate::DifficultyDescription(_) => "difficultyDescription",
            FieldUpdate::OtherThoughts(_) => "otherThoughts",
            FieldUpdate::FollowUpInterest(_) => "followUpInterest",
            FieldUpdate::Email(_) => "email",
        }
    }

    /// The step whose screen owns this field.
    pub fn owner(&self) -> Step {
        match self {
            FieldUpdate::Consent(_) => Step::Welcome,
            FieldUpdate::FirstName(_)
            | FieldUpdate::Segment(_)
            | FieldUpdate::SpecExperience(_)
            | FieldUpdate::VibeCodingExperience(_) => Step::Intake,
            FieldUpdate::Stimulus(_) | FieldUpdate::StimulusFamiliarity(_) => Step::Stimulus,
            FieldUpdate::IntentDescription(_) | FieldUpdate::HintExpanded(_) => {
                Step::IntentCapture
            }
            FieldUpdate::ClarifyingResponse { .. } | FieldUpdate::ClarifyingSkipped(_) => {
                Step::ClarifyingQuestions
            }
            FieldUpdate::DifficultyRating(_)
            | FieldUpdate::VocabGap(_)
            | FieldUpdate::DifficultyDescription(_)
            | FieldUpdate::OtherThoughts(_)
            | FieldUpdate::FollowUpInterest(_)
            | FieldUpdate::Email(_) => Step::Reflection,
        }
    }

    /// Telemetry-safe view of the new value. Free text is reduced to its
    /// length so descriptions and emails never end up in the log buffer.
    pub fn log_value(&self) -> Value {
        match self {
            FieldUpdate::Consent(v) | FieldUpdate::HintExpanded(v) | FieldUpdate::ClarifyingSkipped(v) => {
                json!(v)
            }
            FieldUpdate::FirstName(s)
            | FieldUpdate::IntentDescription(s)
            | FieldUpdate::DifficultyDescription(s)
            | FieldUpdate::OtherThoughts(s)
            | FieldUpdate::Email(s) => json!({ "length": s.chars().count() }),
            FieldUpdate::ClarifyingResponse { question_id, text } => {
                json!({ "questionId": question_id, "length": text.chars().count() })
            }
            FieldUpdate::Stimulus(s) => json!(s),
            FieldUpdate::Segment(v) => json!(v.to_string()),
            FieldUpdate::SpecExperience(v) => json!(v.to_string()),
            FieldUpdate::VibeCodingExperience(v) => json!(v.to_string()),
            FieldUpdate::StimulusFamiliarity(v) => json!(v.to_string()),
            FieldUpdate::DifficultyRating(v) => json!(v),
            FieldUpdate::VocabGap(v) => json!(v.to_string()),
            FieldUpdate::FollowUpInterest(v) => json!(v.to_string()),
        }
    }

    /// Checks the value and writes it into `answers`.
    ///
    /// Ownership is checked by the controller; this only validates values.
    pub fn apply(self, answers: &mut AnswerSet) -> Result<()> {
        match self {
            FieldUpdate::Consent(v) => answers.consent = v,
            FieldUpdate::FirstName(v) => answers.first_name = v,
            FieldUpdate::Segment(v) => answers.segment = Some(v),
            FieldUpdate::SpecExperience(v) => answers.has_written_specs = Some(v),
            FieldUpdate::VibeCodingExperience(v) => answers.vibe_coding_experience = Some(v),
            FieldUpdate::Stimulus(v) => answers.stimulus = v,
            FieldUpdate::StimulusFamiliarity(v) => answers.stimulus_familiarity = Some(v),
            FieldUpdate::IntentDescription(v) => answers.intent_description = v,
            FieldUpdate::HintExpanded(v) => answers.hint_expanded = v,
            FieldUpdate::ClarifyingResponse { question_id, text } => {
                if !answers.clarifying_questions_shown.contains(&question_id) {
                    return Err(SurveyError::UnknownQuestion(question_id));
                }
                answers.clarifying_responses.insert(question_id, text);
            }
            FieldUpdate::ClarifyingSkipped(v) => answers.clarifying_skipped = v,
            FieldUpdate::DifficultyRating(v) => {
                if let Some(rating) = v {
                    if !RATING_RANGE.contains(&rating) {
                        return Err(SurveyError::invalid_value(
                            "difficultyRating",
                            format!("{} is outside 1-5", rating),
                        ));
                    }
                }
                answers.difficulty_rating = v;
            }
            FieldUpdate::VocabGap(v) => answers.vocab_gap = Some(v),
            FieldUpdate::DifficultyDescription(v) => answers.difficulty_description = v,
            FieldUpdate::OtherThoughts(v) => answers.other_thoughts = v,
            FieldUpdate::FollowUpInterest(v) => answers.follow_up_interest = Some(v),
            FieldUpdate::Email(v) => answers.email = v,
        }
        Ok(())
    }
}
