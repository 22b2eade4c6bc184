//! Step sequence, per-step timing, and the controller that drives them.

pub mod controller;
pub mod step;
pub mod timing;

pub use controller::{next_step, previous_step, progress_for, SurveyController, MIN_INTENT_CHARS};
pub use step::{Step, TOTAL_STEPS};
pub use timing::{whole_seconds_between, Clock, StepTimings, SystemClock};
