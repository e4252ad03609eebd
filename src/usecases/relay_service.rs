//! Relay service. One inbound message in, one reply text out.
//!
//! Chains normalizer → workflow dispatch → stream extraction → reply formatting, and turns
//! every failure into a reply so the sender is never left without an answer.

use crate::domain::reply::{format_error, format_outcome};
use crate::domain::{DomainError, ExtractionOutcome, InboundMessage, extract_result};
use crate::ports::{MessageLogPort, WorkflowPort};
use crate::usecases::normalizer::RequestNormalizer;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct RelayService {
    normalizer: RequestNormalizer,
    workflow: Arc<dyn WorkflowPort>,
    message_log: Option<Arc<dyn MessageLogPort>>,
}

impl RelayService {
    /// # Arguments
    /// * `normalizer` - Builds the canonical request (uploads / transcribes media)
    /// * `workflow` - Remote workflow endpoint (HTTP or mock)
    /// * `message_log` - Optional inbound message log; None disables logging
    pub fn new(
        normalizer: RequestNormalizer,
        workflow: Arc<dyn WorkflowPort>,
        message_log: Option<Arc<dyn MessageLogPort>>,
    ) -> Self {
        Self {
            normalizer,
            workflow,
            message_log,
        }
    }

    /// Run one full cycle and return the reply text. Never fails and never returns an empty reply.
    pub async fn handle(&self, message: &InboundMessage) -> String {
        info!(
            msg_id = %message.id,
            sender = %message.sender,
            kind = message.body.kind_label(),
            "message received"
        );

        if let Some(log) = &self.message_log {
            if let Err(e) = log.append(message).await {
                warn!(error = %e, "failed to append to message log");
            }
        }

        match self.run_cycle(message).await {
            Ok(outcome) => {
                match &outcome {
                    Ok(result) => {
                        info!(msg_id = %message.id, package = %result.package, "workflow result extracted")
                    }
                    Err(e) => warn!(
                        msg_id = %message.id,
                        kind = ?e.kind(),
                        detail = %e.detail(),
                        "workflow result extraction failed"
                    ),
                }
                format_outcome(&outcome)
            }
            Err(DomainError::EmptyContent) => {
                info!(msg_id = %message.id, "message has no usable content; workflow skipped");
                format_error(&DomainError::EmptyContent)
            }
            Err(e @ DomainError::RemoteCallFailed { .. }) => {
                warn!(msg_id = %message.id, error = %e, "remote call failed");
                format_error(&e)
            }
            Err(e) => {
                error!(msg_id = %message.id, error = %e, "unexpected error while handling message");
                format_error(&e)
            }
        }
    }

    async fn run_cycle(&self, message: &InboundMessage) -> Result<ExtractionOutcome, DomainError> {
        let request = self.normalizer.normalize(message).await?;
        info!(
            msg_id = %message.id,
            query_len = request.query.len(),
            attachments = request.attachments.len(),
            "request normalized"
        );
        let raw = self.workflow.run(&request).await?;
        Ok(extract_result(&raw))
    }
}
