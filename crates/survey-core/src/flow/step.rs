//! Survey steps.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// One screen of the survey, in presentation order.
///
/// `ClarifyingQuestions` is optional: the controller skips it when the
/// feature is disabled or the intent description leaves nothing out.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
pub enum Step {
    Welcome,
    Intake,
    Stimulus,
    IntentCapture,
    ClarifyingQuestions,
    Reflection,
    ThankYou,
}

/// Configured step count. Progress is computed against this, not against
/// the path a participant actually took.
pub const TOTAL_STEPS: usize = Step::COUNT;

impl Step {
    pub const FIRST: Step = Step::Welcome;
    pub const TERMINAL: Step = Step::ThankYou;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the step at `index`, or `None` when out of range.
    pub fn from_index(index: usize) -> Option<Step> {
        Step::iter().nth(index)
    }

    pub fn is_terminal(self) -> bool {
        self == Step::TERMINAL
    }

    /// The next step in raw index order, capped at the terminal step.
    pub fn following(self) -> Step {
        Step::from_index((self.index() + 1).min(TOTAL_STEPS - 1)).unwrap_or(Step::TERMINAL)
    }

    /// The previous step in raw index order, floored at the first step.
    pub fn preceding(self) -> Step {
        Step::from_index(self.index().saturating_sub(1)).unwrap_or(Step::FIRST)
    }
}
