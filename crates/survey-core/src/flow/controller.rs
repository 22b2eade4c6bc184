//! Survey flow controller.
//!
//! Owns the Answer Set and the step pointer. Screens talk to it only through
//! field updates and transition calls; nothing else mutates either.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::answer::{AnswerSet, FieldUpdate};
use crate::clarifying::{self, ClarifyingQuestion, MAX_QUESTIONS};
use crate::config::SurveyFeatures;
use crate::error::{Result, SurveyError};
use crate::flow::step::{Step, TOTAL_STEPS};
use crate::flow::timing::{whole_seconds_between, Clock, StepTimings};
use crate::snapshot::{SnapshotRepository, SurveySnapshot};
use crate::submission::{submit_survey, SubmissionOutcome, SubmissionPayload, SurveyBackend};

/// Minimum trimmed length of the intent description.
pub const MIN_INTENT_CHARS: usize = 10;

/// The step `advance()` moves to from `current`.
///
/// From IntentCapture the clarifying step is entered only when the feature
/// is on and the description leaves at least one dimension out; otherwise
/// it is skipped without the participant noticing.
pub fn next_step(current: Step, answers: &AnswerSet, features: &SurveyFeatures) -> Step {
    match current {
        Step::IntentCapture => {
            if features.clarifying_questions
                && clarifying::has_missing_dimensions(&answers.intent_description)
            {
                Step::ClarifyingQuestions
            } else {
                Step::Reflection
            }
        }
        Step::ClarifyingQuestions => Step::Reflection,
        other => other.following(),
    }
}

/// The step `retreat()` moves to from `current`. Going back from
/// Reflection always lands on IntentCapture.
pub fn previous_step(current: Step) -> Step {
    match current {
        Step::Reflection => Step::IntentCapture,
        other => other.preceding(),
    }
}

/// Progress in percent for a step, against the configured step count.
pub fn progress_for(step: Step) -> f64 {
    ((step.index() + 1) as f64 / TOTAL_STEPS as f64 * 100.0).min(100.0)
}

/// Set while a submission is in flight.
#[derive(Debug, Default)]
struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(self.0.clone()))
    }
}

/// Clears the busy flag when dropped, including when the submission future
/// is dropped part-way or unwinds.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Finite state machine driving one survey session.
pub struct SurveyController {
    session_id: String,
    features: SurveyFeatures,
    answers: AnswerSet,
    step: Step,
    session_started_at: Option<DateTime<Utc>>,
    step_entered_at: DateTime<Utc>,
    timings: StepTimings,
    submitting: BusyFlag,
    scroll_to_top: bool,
    snapshots: Arc<dyn SnapshotRepository>,
    clock: Arc<dyn Clock>,
}

impl SurveyController {
    /// Starts a fresh session on the Welcome step, ignoring any snapshot.
    pub fn new(
        features: SurveyFeatures,
        snapshots: Arc<dyn SnapshotRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        let controller = Self {
            session_id: Uuid::new_v4().to_string(),
            features,
            answers: AnswerSet::new(),
            step: Step::FIRST,
            session_started_at: None,
            step_entered_at: now,
            timings: StepTimings::new(),
            submitting: BusyFlag::default(),
            scroll_to_top: false,
            snapshots,
            clock,
        };
        tracing::info!(
            target: "survey",
            session_id = %controller.session_id,
            restored = false,
            "Survey initialized"
        );
        controller
    }

    /// Starts a session, rehydrating answers and step from the saved
    /// snapshot when one exists. A snapshot that cannot be read is logged
    /// and ignored.
    pub fn resume(
        features: SurveyFeatures,
        snapshots: Arc<dyn SnapshotRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let saved = match snapshots.load() {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(target: "survey", error = %e, "Failed to load saved state");
                None
            }
        };

        let Some(snapshot) = saved else {
            return Self::new(features, snapshots, clock);
        };

        let mut controller = Self::new(features, snapshots, clock);
        controller.step = snapshot.resume_step();
        controller.answers = snapshot.answers;
        tracing::info!(
            target: "survey",
            session_id = %controller.session_id,
            restored = true,
            step = %controller.step,
            "Restored saved state"
        );
        controller
    }

    // ============================================================================
    // Read access for the presentation layer
    // ============================================================================

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn features(&self) -> &SurveyFeatures {
        &self.features
    }

    pub fn timings(&self) -> &StepTimings {
        &self.timings
    }

    pub fn session_started_at(&self) -> Option<DateTime<Utc>> {
        self.session_started_at
    }

    /// Busy flag: true while a submission is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.submitting.is_set()
    }

    /// Percent complete, `min(100, (index + 1) / TOTAL_STEPS * 100)`.
    pub fn compute_progress(&self) -> f64 {
        progress_for(self.step)
    }

    /// Seconds since the session start latched, or 0 if it never did.
    pub fn session_duration(&self) -> u64 {
        self.session_started_at
            .map(|start| whole_seconds_between(start, self.clock.now()))
            .unwrap_or(0)
    }

    /// Returns true once per forward navigation so the view can reset its
    /// scroll position.
    pub fn take_scroll_to_top(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_top)
    }

    /// Questions for the clarifying step, computed from the current intent.
    pub fn clarifying_questions(&self) -> Vec<&'static ClarifyingQuestion> {
        clarifying::analyze(&self.answers.intent_description, MAX_QUESTIONS)
    }

    // ============================================================================
    // Gates
    // ============================================================================

    /// Why `advance()` is currently blocked, or `None` if it is allowed.
    pub fn advance_blocker(&self) -> Option<&'static str> {
        let answers = &self.answers;
        match self.step {
            Step::Welcome if !answers.consent => Some("consent is required"),
            Step::Intake if answers.first_name.trim().is_empty() => Some("first name is required"),
            Step::Intake if answers.segment.is_none() => Some("a segment must be chosen"),
            Step::Stimulus if answers.stimulus_familiarity.is_none() => {
                Some("familiarity must be chosen")
            }
            Step::IntentCapture
                if answers.intent_description.trim().chars().count() < MIN_INTENT_CHARS =>
            {
                Some("description must be at least 10 characters")
            }
            Step::Reflection => Some("reflection is finished by submitting"),
            Step::ThankYou => Some("the survey is complete"),
            _ => None,
        }
    }

    pub fn can_advance(&self) -> bool {
        self.advance_blocker().is_none()
    }

    /// The submit control is live only on Reflection, with a rating set and
    /// no submission outstanding.
    pub fn can_submit(&self) -> bool {
        self.step == Step::Reflection
            && self.answers.difficulty_rating.is_some()
            && !self.submitting.is_set()
    }

    // ============================================================================
    // Transitions
    // ============================================================================

    /// Moves forward one step, skipping the clarifying step when it has
    /// nothing to ask.
    pub fn advance(&mut self) -> Result<Step> {
        if let Some(reason) = self.advance_blocker() {
            return Err(SurveyError::blocked(self.step, reason));
        }

        let now = self.clock.now();
        if self.step == Step::Welcome && self.session_started_at.is_none() {
            self.session_started_at = Some(now);
            tracing::info!(
                target: "analytics",
                session_id = %self.session_id,
                start_time = %now.to_rfc3339(),
                "Session started"
            );
        }

        let target = next_step(self.step, &self.answers, &self.features);
        if self.step == Step::IntentCapture && target != Step::ClarifyingQuestions {
            // Answers from an earlier pass through the clarifying step no
            // longer belong to this description.
            self.answers.clarifying_questions_shown.clear();
            self.answers.clarifying_responses.clear();
            self.answers.clarifying_skipped = false;
        }
        self.leave_current(now, target);
        self.enter(target, now);
        self.scroll_to_top = true;
        Ok(target)
    }

    /// Moves back one step. Welcome stays put; there is no way back out of
    /// the clarifying step or the terminal step.
    pub fn retreat(&mut self) -> Result<Step> {
        match self.step {
            Step::Welcome => return Ok(Step::Welcome),
            Step::ClarifyingQuestions => {
                return Err(SurveyError::blocked(
                    self.step,
                    "clarifying questions can only be answered or skipped",
                ));
            }
            Step::ThankYou => {
                return Err(SurveyError::blocked(self.step, "the survey is complete"));
            }
            _ => {}
        }

        let now = self.clock.now();
        let target = previous_step(self.step);
        self.leave_current(now, target);
        self.enter(target, now);
        Ok(target)
    }

    /// Direct transition for recovery flows.
    ///
    /// Unlike `advance()` and `retreat()` this does not flush the elapsed
    /// time of the step being left; that time is dropped.
    pub fn jump_to(&mut self, index: usize) -> Result<Step> {
        let target = Step::from_index(index)
            .ok_or_else(|| SurveyError::not_found("step", index.to_string()))?;

        tracing::warn!(
            target: "navigation",
            session_id = %self.session_id,
            from = %self.step,
            to = %target,
            elapsed_flushed = false,
            "Direct navigation to {}",
            target
        );
        let now = self.clock.now();
        self.enter(target, now);
        self.scroll_to_top = true;
        Ok(target)
    }

    /// Marks the clarifying step as skipped and moves on to Reflection.
    pub fn skip_clarifying(&mut self) -> Result<Step> {
        self.update_field(FieldUpdate::ClarifyingSkipped(true))?;
        self.advance()
    }

    // ============================================================================
    // Field updates
    // ============================================================================

    /// Applies a single-field update issued by the active step, then
    /// persists the snapshot.
    pub fn update_field(&mut self, update: FieldUpdate) -> Result<()> {
        let owner = update.owner();
        let field = update.field_name();
        if owner != self.step {
            return Err(SurveyError::FieldNotOwned {
                field,
                owner,
                active: self.step,
            });
        }

        let logged = update.log_value();
        update.apply(&mut self.answers)?;
        tracing::debug!(
            target: "form",
            session_id = %self.session_id,
            field = field,
            value = %logged,
            "Field updated: {}",
            field
        );

        self.persist_snapshot();
        Ok(())
    }

    // ============================================================================
    // Submission
    // ============================================================================

    /// Hands the session to the record store and finishes the survey.
    ///
    /// The survey reaches ThankYou and the local snapshot is cleared whether
    /// the store accepted the data or not; the outcome says which.
    pub async fn submit(&mut self, backend: &dyn SurveyBackend) -> Result<SubmissionOutcome> {
        if self.submitting.is_set() {
            return Err(SurveyError::SubmissionInProgress);
        }
        if self.step != Step::Reflection {
            return Err(SurveyError::blocked(self.step, "submission happens from reflection"));
        }
        if self.answers.difficulty_rating.is_none() {
            return Err(SurveyError::blocked(self.step, "a difficulty rating is required"));
        }

        tracing::info!(target: "survey", session_id = %self.session_id, "Submission started");
        let _busy = self
            .submitting
            .acquire()
            .ok_or(SurveyError::SubmissionInProgress)?;

        let now = self.clock.now();
        self.leave_current(now, Step::ThankYou);
        let payload = SubmissionPayload {
            answers: self.answers.clone(),
            step_timings: self.timings.clone(),
            duration_seconds: self.session_duration(),
        };

        let outcome = submit_survey(backend, &payload, now).await;
        if outcome.success {
            tracing::info!(
                target: "survey",
                participant_id = ?outcome.participant_id,
                session_id = ?outcome.session_id,
                "Submission successful"
            );
        } else {
            tracing::warn!(
                target: "survey",
                error = ?outcome.error,
                "Submission to database failed, but continuing"
            );
        }

        tracing::info!(
            target: "analytics",
            session_id = %self.session_id,
            duration_seconds = payload.duration_seconds,
            word_count = self.answers.word_count(),
            hint_expanded = self.answers.hint_expanded,
            segment = ?self.answers.segment,
            followup_interest = ?self.answers.follow_up_interest,
            screen_times = %serde_json::to_string(&payload.step_timings).unwrap_or_default(),
            db_success = outcome.success,
            "Session completed"
        );

        self.clear_snapshot();
        self.enter(Step::ThankYou, self.clock.now());
        self.scroll_to_top = true;
        Ok(outcome)
    }

    // ============================================================================
    // Internals
    // ============================================================================

    /// Flushes the time spent on the current step.
    fn leave_current(&mut self, now: DateTime<Utc>, target: Step) {
        let spent = whole_seconds_between(self.step_entered_at, now);
        self.timings.add(self.step, spent);
        tracing::info!(
            target: "navigation",
            session_id = %self.session_id,
            from = %self.step,
            to = %target,
            progress = format!("{}%", progress_for(self.step).round()),
            time_on_screen = format!("{}s", spent),
            "Navigate: {} -> {}",
            self.step,
            target
        );
    }

    fn enter(&mut self, target: Step, now: DateTime<Utc>) {
        self.step = target;
        self.step_entered_at = now;
        if target == Step::ClarifyingQuestions {
            let shown: Vec<String> = self
                .clarifying_questions()
                .iter()
                .map(|q| q.id.to_string())
                .collect();
            self.answers
                .clarifying_responses
                .retain(|id, _| shown.contains(id));
            self.answers.clarifying_questions_shown = shown;
            self.answers.clarifying_skipped = false;
        }
        self.persist_snapshot();
    }

    fn persist_snapshot(&self) {
        if self.step.is_terminal() {
            self.clear_snapshot();
            return;
        }
        let snapshot = SurveySnapshot::new(self.step, self.answers.clone());
        if let Err(e) = self.snapshots.save(&snapshot) {
            tracing::warn!(target: "survey", error = %e, "Failed to save state");
        }
    }

    fn clear_snapshot(&self) {
        if let Err(e) = self.snapshots.clear() {
            tracing::warn!(target: "survey", error = %e, "Failed to clear saved state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerSet;

    #[test]
    fn test_next_step_enters_clarifying_when_dimensions_missing() {
        let mut answers = AnswerSet::new();
        answers.intent_description = "short idea".to_string();
        let features = SurveyFeatures::default();
        assert_eq!(
            next_step(Step::IntentCapture, &answers, &features),
            Step::ClarifyingQuestions
        );
    }

    #[test]
    fn test_next_step_skips_clarifying_when_covered() {
        let mut answers = AnswerSet::new();
        answers.intent_description =
            "I would create projects with tasks and see them on a calendar every week.".to_string();
        assert_eq!(
            next_step(Step::IntentCapture, &answers, &SurveyFeatures::default()),
            Step::Reflection
        );
    }

    #[test]
    fn test_next_step_skips_clarifying_when_disabled() {
        let features = SurveyFeatures {
            clarifying_questions: false,
            card_sort: false,
        };
        assert_eq!(
            next_step(Step::IntentCapture, &AnswerSet::new(), &features),
            Step::Reflection
        );
    }

    #[test]
    fn test_linear_steps() {
        let answers = AnswerSet::new();
        let features = SurveyFeatures::default();
        assert_eq!(next_step(Step::Welcome, &answers, &features), Step::Intake);
        assert_eq!(next_step(Step::Stimulus, &answers, &features), Step::IntentCapture);
        assert_eq!(next_step(Step::ClarifyingQuestions, &answers, &features), Step::Reflection);
        assert_eq!(next_step(Step::ThankYou, &answers, &features), Step::ThankYou);
    }

    #[test]
    fn test_previous_step() {
        assert_eq!(previous_step(Step::Reflection), Step::IntentCapture);
        assert_eq!(previous_step(Step::Intake), Step::Welcome);
        assert_eq!(previous_step(Step::Welcome), Step::Welcome);
    }

    #[test]
    fn test_progress_for() {
        assert!((progress_for(Step::Welcome) - 100.0 / 7.0).abs() < 1e-9);
        assert_eq!(progress_for(Step::ThankYou), 100.0);
    }
}
