//! Mock workflow adapter for running without an API key.
//!
//! Implements upload, transcription and workflow ports with canned responses. The workflow
//! stream has the same `data: <json>` framing as the real endpoint, so extraction runs for real.

use crate::domain::{CanonicalRequest, DomainError, StoredAttachment, UserId};
use crate::ports::{MediaUploadPort, TranscriptionPort, WorkflowPort};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

/// Mock workflow API.
///
/// Simulates network latency with a configurable delay and counts workflow runs.
pub struct MockWorkflowAdapter {
    delay_ms: u64,
    uploads: AtomicUsize,
    runs: AtomicUsize,
}

impl MockWorkflowAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self::with_delay(100)
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            uploads: AtomicUsize::new(0),
            runs: AtomicUsize::new(0),
        }
    }

    /// Number of workflow runs dispatched so far.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
    }

    /// Raw stream for one run: a start frame, a heartbeat, then a successful finish frame.
    pub fn canned_stream(request: &CanonicalRequest) -> String {
        let started = json!({"event": "workflow_started", "data": {"id": "mock-run"}});
        let finished = json!({
            "event": "workflow_finished",
            "data": {
                "status": "succeeded",
                "outputs": {
                    "package_output": {
                        "Package": "[MOCK] Standard",
                        "Reason": format!(
                            "[MOCK] Simulated recommendation for: {} ({} attachment(s))",
                            request.query,
                            request.attachments.len()
                        ),
                        "Language": "en"
                    }
                }
            }
        });
        format!("data: {started}\n\nevent: ping\n\ndata: {finished}\n\n")
    }
}

impl Default for MockWorkflowAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MediaUploadPort for MockWorkflowAdapter {
    async fn upload(
        &self,
        attachment: &StoredAttachment,
        user: &UserId,
    ) -> Result<String, DomainError> {
        info!(file = %attachment.file_name, user = %user, "[MOCK] Simulating upload");
        self.simulate_latency().await;
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("mock-file-{}", n))
    }
}

#[async_trait::async_trait]
impl TranscriptionPort for MockWorkflowAdapter {
    async fn transcribe(
        &self,
        attachment: &StoredAttachment,
        user: &UserId,
    ) -> Result<String, DomainError> {
        info!(file = %attachment.file_name, user = %user, "[MOCK] Simulating transcription");
        self.simulate_latency().await;
        Ok("[MOCK] transcribed voice message".to_string())
    }
}

#[async_trait::async_trait]
impl WorkflowPort for MockWorkflowAdapter {
    async fn run(&self, request: &CanonicalRequest) -> Result<String, DomainError> {
        info!(user = %request.user, "[MOCK] Simulating workflow run");
        self.simulate_latency().await;
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(Self::canned_stream(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extract_result;

    #[tokio::test]
    async fn canned_stream_extracts() {
        let adapter = MockWorkflowAdapter::with_delay(1);
        let request = CanonicalRequest {
            query: "hello".into(),
            user: UserId::new("alice"),
            attachments: vec![],
            conversation_id: String::new(),
        };

        let raw = adapter.run(&request).await.unwrap();
        let result = extract_result(&raw).unwrap();

        assert_eq!(result.package, "[MOCK] Standard");
        assert!(result.reason.contains("hello"));
        assert_eq!(adapter.runs(), 1);
    }
}
