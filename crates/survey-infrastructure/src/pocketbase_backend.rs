//! SurveyBackend over the PocketBase REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use survey_core::error::{Result, SurveyError};
use survey_core::submission::{
    ClarifyingResponseRecord, IntentResponseRecord, ParticipantRecord, SessionFeedbackRecord,
    SessionRecord, SessionUpdate, SurveyBackend,
};

const PARTICIPANTS: &str = "participants";
const SESSIONS: &str = "sessions";
const INTENT_RESPONSES: &str = "intent_responses";
const CLARIFYING_RESPONSES: &str = "clarifying_responses";
const SESSION_FEEDBACK: &str = "session_feedback";

/// The part of a record response we need
#[derive(Debug, Deserialize)]
struct RecordResponse {
    id: String,
}

/// Error body returned by PocketBase
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
}

pub struct PocketBaseBackend {
    client: Client,
    base_url: String,
}

impl PocketBaseBackend {
    /// Every request is bounded by `timeout`. Requests are not retried.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SurveyError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{}/records", self.base_url, collection)
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        method: Method,
        url: String,
        body: &T,
    ) -> Result<String> {
        let response = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| SurveyError::backend_write(operation, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiError>(&text)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(SurveyError::backend_write(
                operation,
                format!("{}: {}", status, detail),
            ));
        }

        let record: RecordResponse = response
            .json()
            .await
            .map_err(|e| SurveyError::backend_write(operation, e.to_string()))?;
        tracing::debug!(target: "survey", operation, id = %record.id, "Record written");
        Ok(record.id)
    }

    async fn create<T: Serialize>(
        &self,
        operation: &'static str,
        collection: &str,
        record: &T,
    ) -> Result<String> {
        self.send(operation, Method::POST, self.records_url(collection), record)
            .await
    }
}

#[async_trait]
impl SurveyBackend for PocketBaseBackend {
    async fn check_connection(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(target: "survey", status = %response.status(), "Health check failed");
                false
            }
            Err(e) => {
                tracing::warn!(target: "survey", error = %e, "Record store not reachable");
                false
            }
        }
    }

    async fn create_participant(&self, record: ParticipantRecord) -> Result<String> {
        self.create("createParticipant", PARTICIPANTS, &record).await
    }

    async fn create_session(&self, record: SessionRecord) -> Result<String> {
        self.create("createSession", SESSIONS, &record).await
    }

    async fn update_session(&self, id: &str, update: SessionUpdate) -> Result<String> {
        let url = format!("{}/{}", self.records_url(SESSIONS), id);
        self.send("updateSession", Method::PATCH, url, &update).await
    }

    async fn create_intent_response(&self, record: IntentResponseRecord) -> Result<String> {
        self.create("createIntentResponse", INTENT_RESPONSES, &record)
            .await
    }

    async fn create_clarifying_response(
        &self,
        record: ClarifyingResponseRecord,
    ) -> Result<String> {
        self.create("createClarifyingResponse", CLARIFYING_RESPONSES, &record)
            .await
    }

    async fn create_session_feedback(&self, record: SessionFeedbackRecord) -> Result<String> {
        self.create("createSessionFeedback", SESSION_FEEDBACK, &record)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Answers one request with a canned response and hands back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            request
        });
        (base_url, handle)
    }

    fn backend(base_url: &str) -> PocketBaseBackend {
        PocketBaseBackend::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn participant() -> ParticipantRecord {
        ParticipantRecord {
            name: "Ada".to_string(),
            email: None,
            segment: "Engineer".to_string(),
            has_written_specs: "unknown".to_string(),
            vibe_coding_experience: "Little".to_string(),
            consent_given: true,
            consent_timestamp: "2026-03-01T12:00:00.000Z".to_string(),
            open_to_followup: false,
        }
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let backend = backend("http://127.0.0.1:8090/");
        assert_eq!(
            backend.records_url(PARTICIPANTS),
            "http://127.0.0.1:8090/api/collections/participants/records"
        );
    }

    #[tokio::test]
    async fn test_create_posts_record_and_returns_id() {
        let (base_url, server) = serve_once("200 OK", r#"{"id":"p_123","name":"Ada"}"#).await;

        let id = backend(&base_url)
            .create_participant(participant())
            .await
            .unwrap();

        assert_eq!(id, "p_123");
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/collections/participants/records "));
        assert!(request.contains(r#""consent_given":true"#));
        assert!(!request.contains("email"));
    }

    #[tokio::test]
    async fn test_update_session_patches_record() {
        let (base_url, server) = serve_once("200 OK", r#"{"id":"s_9"}"#).await;

        let update = SessionUpdate {
            duration_seconds: Some(42),
            ..Default::default()
        };
        let id = backend(&base_url).update_session("s_9", update).await.unwrap();

        assert_eq!(id, "s_9");
        let request = server.await.unwrap();
        assert!(request.starts_with("PATCH /api/collections/sessions/records/s_9 "));
        assert!(request.contains(r#"{"duration_seconds":42}"#));
    }

    #[tokio::test]
    async fn test_rejected_write_is_backend_error() {
        let (base_url, _server) = serve_once(
            "400 Bad Request",
            r#"{"code":400,"message":"Failed to create record.","data":{}}"#,
        )
        .await;

        let err = backend(&base_url)
            .create_participant(participant())
            .await
            .unwrap_err();

        assert!(err.is_backend());
        let message = err.to_string();
        assert!(message.contains("createParticipant"));
        assert!(message.contains("Failed to create record."));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (base_url, server) = serve_once("200 OK", r#"{"code":200,"message":"API is healthy."}"#).await;
        assert!(backend(&base_url).check_connection().await);
        assert!(server.await.unwrap().starts_with("GET /api/health "));
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        assert!(!backend(&base_url).check_connection().await);
    }
}
