//! The Answer Set and the single-field updates that mutate it.

pub mod field;
pub mod model;

pub use field::{FieldUpdate, RATING_RANGE};
pub use model::{
    AnswerSet, Segment, SpecExperience, StimulusFamiliarity, VibeCodingExperience, VocabGap,
    YesNo, DEFAULT_STIMULUS,
};
