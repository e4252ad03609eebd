//! Inbound port. The messaging transport delivers messages into the application.

use crate::domain::{DomainError, InboundMessage};

/// Messaging transport: a stream of inbound messages plus a way to answer each one.
#[async_trait::async_trait]
pub trait MessengerPort: Send + Sync {
    /// Wait for the next inbound message. `None` means the transport is closed.
    async fn next_message(&self) -> Result<Option<InboundMessage>, DomainError>;

    /// Send the reply text for `message` back to its sender.
    async fn send_reply(&self, message: &InboundMessage, text: &str) -> Result<(), DomainError>;
}
