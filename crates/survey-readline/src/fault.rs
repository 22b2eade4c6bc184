//! Failure isolation for screen turns.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

pub const FAULT_NOTICE: &str =
    "Something went wrong. Your responses have been preserved, so nothing is lost.";

/// Catches an error or a panic escaping a screen turn so the session can
/// carry on. Retrying clears the fault and nothing else; answers and the
/// current step are untouched.
#[derive(Debug, Default)]
pub struct FaultBoundary {
    fault: Option<String>,
}

impl FaultBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }

    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn retry(&mut self) {
        self.fault = None;
    }

    /// Runs `turn`. Returns `None` if it failed, leaving the fault recorded.
    pub async fn guard<T, F>(&mut self, turn: F) -> Option<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match AssertUnwindSafe(turn).catch_unwind().await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                self.record(format!("{:#}", e));
                None
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                self.record(message);
                None
            }
        }
    }

    fn record(&mut self, message: String) {
        tracing::error!(target: "survey", error = %message, "Screen failed");
        self.fault = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary_should_panic() -> bool {
        true
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let mut boundary = FaultBoundary::new();
        let value = boundary.guard(async { Ok::<_, anyhow::Error>(7) }).await;

        assert_eq!(value, Some(7));
        assert!(!boundary.has_fault());
    }

    #[tokio::test]
    async fn test_error_is_recorded() {
        let mut boundary = FaultBoundary::new();
        let value: Option<()> = boundary
            .guard(async { Err(anyhow::anyhow!("render failed")) })
            .await;

        assert!(value.is_none());
        assert_eq!(boundary.fault(), Some("render failed"));
    }

    #[tokio::test]
    async fn test_panic_is_caught_and_retry_resets() {
        let mut boundary = FaultBoundary::new();
        let value = boundary
            .guard(async {
                if boundary_should_panic() {
                    panic!("screen exploded");
                }
                Ok::<(), anyhow::Error>(())
            })
            .await;

        assert!(value.is_none());
        assert_eq!(boundary.fault(), Some("screen exploded"));

        boundary.retry();
        assert!(!boundary.has_fault());
    }
}
