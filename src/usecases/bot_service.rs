//! Bot service: listen loop over the messaging transport.
//!
//! Each inbound message is handled in its own tokio task. Tasks share only the read-only
//! relay service; a panicking task still produces an apology reply.

use crate::domain::reply::APOLOGY_REPLY;
use crate::domain::{DomainError, InboundMessage};
use crate::ports::MessengerPort;
use crate::usecases::relay_service::RelayService;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub struct BotService {
    messenger: Arc<dyn MessengerPort>,
    relay: Arc<RelayService>,
}

impl BotService {
    pub fn new(messenger: Arc<dyn MessengerPort>, relay: Arc<RelayService>) -> Self {
        Self { messenger, relay }
    }

    /// Receive messages until the transport closes, then wait for in-flight cycles.
    /// Returns the number of messages handled. A transport error stops receiving but still
    /// lets every dispatched cycle reply before it is returned.
    pub async fn run(&self) -> Result<usize, DomainError> {
        let mut tasks = JoinSet::new();
        let mut received = 0usize;

        info!("bot listening for messages");
        let mut transport_error = None;
        loop {
            let message = match self.messenger.next_message().await {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "transport failed; no longer receiving");
                    transport_error = Some(e);
                    break;
                }
            };
            received += 1;
            let messenger = Arc::clone(&self.messenger);
            let relay = Arc::clone(&self.relay);
            tasks.spawn(async move {
                Self::handle_one(messenger, relay, message).await;
            });

            // Reap finished tasks so the set does not grow with every message
            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = joined {
                    error!(error = %e, "message task aborted");
                }
            }
        }

        info!(in_flight = tasks.len(), "transport closed; waiting for in-flight messages");
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "message task aborted");
            }
        }
        match transport_error {
            Some(e) => Err(e),
            None => Ok(received),
        }
    }

    async fn handle_one(
        messenger: Arc<dyn MessengerPort>,
        relay: Arc<RelayService>,
        message: InboundMessage,
    ) {
        // Inner task isolates panics from the pipeline
        let cycle_msg = message.clone();
        let reply = match tokio::spawn(async move { relay.handle(&cycle_msg).await }).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(msg_id = %message.id, error = %e, "message cycle panicked");
                APOLOGY_REPLY.to_string()
            }
        };

        if let Err(e) = messenger.send_reply(&message, &reply).await {
            warn!(msg_id = %message.id, error = %e, "failed to send reply");
        }
    }
}
