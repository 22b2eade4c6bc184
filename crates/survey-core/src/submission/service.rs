//! Submission orchestration.
//!
//! Writes one completed session to the record store in a fixed order:
//! health check, participant, session, intent response, clarifying
//! response (only when the step was reached), session feedback. A failure
//! aborts the remaining writes but does not undo the ones already made.
//! Either way the full payload is logged so it can be recovered by hand.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::Serialize;

use crate::answer::AnswerSet;
use crate::error::{Result, SurveyError};
use crate::flow::step::Step;
use crate::flow::timing::StepTimings;
use crate::submission::backend::SurveyBackend;
use crate::submission::record::{
    ClarifyingResponseRecord, IntentResponseRecord, ParticipantRecord, SessionFeedbackRecord,
    SessionRecord, UNKNOWN,
};

/// Everything handed to the record store for one session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub answers: AnswerSet,
    pub step_timings: StepTimings,
    pub duration_seconds: u64,
}

/// Result of a submission attempt. Failure is reported, never raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionOutcome {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn choice_or_unknown<T: ToString>(choice: Option<T>) -> String {
    choice
        .map(|c| c.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// Submits `payload` to `backend`. `now` stamps every record.
pub async fn submit_survey(
    backend: &dyn SurveyBackend,
    payload: &SubmissionPayload,
    now: DateTime<Utc>,
) -> SubmissionOutcome {
    if !backend.check_connection().await {
        tracing::warn!(target: "survey", "Record store unavailable - logging data only");
        log_for_recovery(payload, "record store unavailable", now);
        return SubmissionOutcome::failed(
            SurveyError::BackendUnavailable(
                "Database unavailable. Data has been logged for recovery.".to_string(),
            )
            .to_string(),
        );
    }

    match write_records(backend, payload, now).await {
        Ok((participant_id, session_id)) => {
            tracing::info!(
                target: "analytics",
                participant_id = %participant_id,
                session_id = %session_id,
                word_count = payload.answers.word_count(),
                "Survey submitted successfully"
            );
            SubmissionOutcome {
                success: true,
                participant_id: Some(participant_id),
                session_id: Some(session_id),
                error: None,
            }
        }
        Err(e) => {
            tracing::error!(target: "survey", error = %e, "Survey submission failed");
            log_for_recovery(payload, &e.to_string(), now);
            SubmissionOutcome::failed(e.to_string())
        }
    }
}

fn log_for_recovery(payload: &SubmissionPayload, reason: &str, now: DateTime<Utc>) {
    let data = serde_json::to_string(payload).unwrap_or_else(|e| format!("<unserializable: {}>", e));
    tracing::error!(
        target: "analytics",
        reason = reason,
        payload = %data,
        timestamp = %timestamp(now),
        "Failed submission data"
    );
}

async fn write_records(
    backend: &dyn SurveyBackend,
    payload: &SubmissionPayload,
    now: DateTime<Utc>,
) -> Result<(String, String)> {
    let answers = &payload.answers;
    let submitted_at = timestamp(now);

    let participant_id = backend
        .create_participant(ParticipantRecord {
            name: answers.first_name.clone(),
            email: non_empty(&answers.email),
            segment: choice_or_unknown(answers.segment),
            has_written_specs: choice_or_unknown(answers.has_written_specs),
            vibe_coding_experience: choice_or_unknown(answers.vibe_coding_experience),
            consent_given: answers.consent,
            consent_timestamp: submitted_at.clone(),
            open_to_followup: answers.follow_up_interest == Some(crate::answer::YesNo::Yes),
        })
        .await?;
    tracing::debug!(target: "survey", id = %participant_id, "Participant created");

    let started_at = i64::try_from(payload.duration_seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|elapsed| now.checked_sub_signed(elapsed))
        .unwrap_or(now);
    let session_id = backend
        .create_session(SessionRecord {
            participant: participant_id.clone(),
            stimulus: answers.stimulus.clone(),
            stimulus_familiarity: choice_or_unknown(answers.stimulus_familiarity),
            started_at: timestamp(started_at),
            completed_at: Some(submitted_at.clone()),
            duration_seconds: Some(payload.duration_seconds),
        })
        .await?;
    tracing::debug!(target: "survey", id = %session_id, "Session created");

    let intent_id = backend
        .create_intent_response(IntentResponseRecord {
            session: session_id.clone(),
            raw_text: answers.intent_description.clone(),
            word_count: answers.word_count(),
            time_spent_seconds: payload.step_timings.get(Step::IntentCapture),
            hint_expanded: answers.hint_expanded,
            submitted_at: submitted_at.clone(),
        })
        .await?;
    tracing::debug!(target: "survey", id = %intent_id, "Intent response saved");

    if !answers.clarifying_questions_shown.is_empty() || answers.clarifying_skipped {
        let clarifying_id = backend
            .create_clarifying_response(ClarifyingResponseRecord {
                session: session_id.clone(),
                questions_shown: serde_json::to_string(&answers.clarifying_questions_shown)?,
                responses: serde_json::to_string(&answers.clarifying_responses)?,
                skipped: answers.clarifying_skipped,
                submitted_at: submitted_at.clone(),
            })
            .await?;
        tracing::debug!(
            target: "survey",
            id = %clarifying_id,
            skipped = answers.clarifying_skipped,
            "Clarifying response saved"
        );
    }

    let feedback_id = backend
        .create_session_feedback(SessionFeedbackRecord {
            session: session_id.clone(),
            difficulty_rating: answers.difficulty_rating.unwrap_or(0),
            felt_vocabulary_gap: choice_or_unknown(answers.vocab_gap),
            vocabulary_gap_details: non_empty(&answers.difficulty_description),
            open_feedback: non_empty(&answers.other_thoughts),
            submitted_at,
        })
        .await?;
    tracing::debug!(target: "survey", id = %feedback_id, "Session feedback saved");

    Ok((participant_id, session_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::{Segment, VocabGap, YesNo};
    use crate::submission::record::SessionUpdate;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Records every call and fails at a chosen operation.
    #[derive(Default)]
    struct ScriptedBackend {
        offline: bool,
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<String>>,
        sessions: Mutex<Vec<SessionRecord>>,
        intents: Mutex<Vec<IntentResponseRecord>>,
        participants: Mutex<Vec<ParticipantRecord>>,
        feedback: Mutex<Vec<SessionFeedbackRecord>>,
    }

    impl ScriptedBackend {
        fn record(&self, op: &'static str) -> Result<String> {
            self.calls.lock().unwrap().push(op.to_string());
            if self.fail_on == Some(op) {
                return Err(SurveyError::backend_write(op, "400 Bad Request"));
            }
            Ok(format!("{}-id", op))
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SurveyBackend for ScriptedBackend {
        async fn check_connection(&self) -> bool {
            self.calls.lock().unwrap().push("checkConnection".to_string());
            !self.offline
        }

        async fn create_participant(&self, record: ParticipantRecord) -> Result<String> {
            self.participants.lock().unwrap().push(record);
            self.record("createParticipant")
        }

        async fn create_session(&self, record: SessionRecord) -> Result<String> {
            self.sessions.lock().unwrap().push(record);
            self.record("createSession")
        }

        async fn update_session(&self, _id: &str, _update: SessionUpdate) -> Result<String> {
            self.record("updateSession")
        }

        async fn create_intent_response(&self, record: IntentResponseRecord) -> Result<String> {
            self.intents.lock().unwrap().push(record);
            self.record("createIntentResponse")
        }

        async fn create_clarifying_response(
            &self,
            _record: ClarifyingResponseRecord,
        ) -> Result<String> {
            self.record("createClarifyingResponse")
        }

        async fn create_session_feedback(&self, record: SessionFeedbackRecord) -> Result<String> {
            self.feedback.lock().unwrap().push(record);
            self.record("createSessionFeedback")
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn payload() -> SubmissionPayload {
        let mut answers = AnswerSet::new();
        answers.consent = true;
        answers.first_name = "Ada".to_string();
        answers.segment = Some(Segment::Engineer);
        answers.intent_description = "I want a list of tasks".to_string();
        answers.difficulty_rating = Some(3);
        answers.vocab_gap = Some(VocabGap::Unsure);
        answers.follow_up_interest = Some(YesNo::Yes);
        let mut step_timings = StepTimings::new();
        step_timings.add(Step::IntentCapture, 95);
        SubmissionPayload {
            answers,
            step_timings,
            duration_seconds: 600,
        }
    }

    #[tokio::test]
    async fn test_writes_in_order_without_clarifying() {
        let backend = ScriptedBackend::default();
        let outcome = submit_survey(&backend, &payload(), fixed_now()).await;

        assert!(outcome.success);
        assert_eq!(outcome.participant_id.as_deref(), Some("createParticipant-id"));
        assert_eq!(outcome.session_id.as_deref(), Some("createSession-id"));
        assert_eq!(
            backend.calls(),
            vec![
                "checkConnection",
                "createParticipant",
                "createSession",
                "createIntentResponse",
                "createSessionFeedback",
            ]
        );
    }

    #[tokio::test]
    async fn test_clarifying_written_when_shown_or_skipped() {
        let backend = ScriptedBackend::default();
        let mut p = payload();
        p.answers.clarifying_skipped = true;
        submit_survey(&backend, &p, fixed_now()).await;
        assert!(backend.calls().contains(&"createClarifyingResponse".to_string()));

        let backend = ScriptedBackend::default();
        let mut p = payload();
        p.answers.clarifying_questions_shown = vec!["views".to_string()];
        submit_survey(&backend, &p, fixed_now()).await;
        assert_eq!(backend.calls()[4], "createClarifyingResponse");
    }

    #[tokio::test]
    async fn test_record_contents() {
        let backend = ScriptedBackend::default();
        submit_survey(&backend, &payload(), fixed_now()).await;

        let participant = backend.participants.lock().unwrap()[0].clone();
        assert_eq!(participant.segment, "Engineer");
        assert_eq!(participant.has_written_specs, "unknown");
        assert!(participant.email.is_none());
        assert!(participant.open_to_followup);

        let session = backend.sessions.lock().unwrap()[0].clone();
        assert_eq!(session.started_at, "2026-03-01T11:50:00.000Z");
        assert_eq!(session.duration_seconds, Some(600));
        assert_eq!(session.stimulus, "todo_app");

        let intent = backend.intents.lock().unwrap()[0].clone();
        assert_eq!(intent.word_count, 6);
        assert_eq!(intent.time_spent_seconds, 95);

        let feedback = backend.feedback.lock().unwrap()[0].clone();
        assert_eq!(feedback.difficulty_rating, 3);
        assert_eq!(feedback.felt_vocabulary_gap, "Unsure");
        assert!(feedback.open_feedback.is_none());
    }

    #[tokio::test]
    async fn test_offline_short_circuits() {
        let backend = ScriptedBackend {
            offline: true,
            ..Default::default()
        };
        let outcome = submit_survey(&backend, &payload(), fixed_now()).await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("logged for recovery"));
        assert_eq!(backend.calls(), vec!["checkConnection"]);
    }

    #[tokio::test]
    async fn test_write_failure_aborts_remaining_writes() {
        let backend = ScriptedBackend {
            fail_on: Some("createSession"),
            ..Default::default()
        };
        let outcome = submit_survey(&backend, &payload(), fixed_now()).await;

        assert!(!outcome.success);
        assert!(outcome.participant_id.is_none());
        assert!(outcome.error.unwrap().contains("createSession"));
        assert_eq!(
            backend.calls(),
            vec!["checkConnection", "createParticipant", "createSession"]
        );
    }
}
