//! Implements WorkflowPort via `POST /workflows/run` in streaming mode.
//!
//! The event stream is drained completely before returning; callers never see partial reads.

use crate::adapters::workflow::api_client::{ApiClient, transport_error_text};
use crate::domain::{AttachmentRef, CanonicalRequest, DomainError};
use crate::ports::WorkflowPort;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

const RUN_PATH: &str = "workflows/run";

pub struct HttpWorkflowDispatcher {
    api: ApiClient,
}

impl HttpWorkflowDispatcher {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn body<'a>(&'a self, request: &'a CanonicalRequest) -> RunRequest<'a> {
        RunRequest {
            query: &request.query,
            user: request.user.as_str(),
            files: &request.attachments,
            conversation_id: &request.conversation_id,
            response_mode: "streaming",
            inputs: HashMap::from([(self.api.settings().input_key.as_str(), request.query.as_str())]),
        }
    }
}

/// Workflow run request body.
#[derive(Serialize)]
struct RunRequest<'a> {
    query: &'a str,
    user: &'a str,
    files: &'a [AttachmentRef],
    conversation_id: &'a str,
    response_mode: &'static str,
    inputs: HashMap<&'a str, &'a str>,
}

#[async_trait::async_trait]
impl WorkflowPort for HttpWorkflowDispatcher {
    async fn run(&self, request: &CanonicalRequest) -> Result<String, DomainError> {
        let body = self.body(request);
        info!(
            user = %request.user,
            query_len = request.query.len(),
            files = request.attachments.len(),
            "dispatching workflow run"
        );

        let mut response = self.api.post(RUN_PATH, |req| req.json(&body)).await?;
        let status = response.status().as_u16();

        let mut raw: Vec<u8> = Vec::new();
        let mut chunks = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| {
                warn!(endpoint = RUN_PATH, error = %e, "workflow stream interrupted");
                DomainError::remote(RUN_PATH, Some(status), transport_error_text(&e))
            })?
        {
            chunks += 1;
            raw.extend_from_slice(&chunk);
        }
        debug!(chunks, bytes = raw.len(), "workflow stream drained");

        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}
