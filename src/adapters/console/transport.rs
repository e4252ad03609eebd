//! Implements MessengerPort on stdin/stdout.
//!
//! Each input line is one message from a single local sender:
//! - `/image <path> [mime]` sends the file as an image
//! - `/voice <path> [mime]` (or `/audio`) sends the file as a voice note
//! - `/quit` closes the transport
//! - any other `/command` is an unsupported message kind
//! - everything else is a text message

use crate::domain::{DomainError, InboundMessage, MediaPayload, MessageBody, UserId};
use crate::ports::MessengerPort;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Parsed console line.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleInput {
    Text(String),
    Image { path: String, mime: Option<String> },
    Audio { path: String, mime: Option<String> },
    Unsupported(String),
    Quit,
}

/// Parse one input line. Pure; file reading happens in the transport.
pub fn parse_line(line: &str) -> ConsoleInput {
    let Some(command) = line.trim().strip_prefix('/') else {
        return ConsoleInput::Text(line.to_string());
    };
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let path = parts.next().map(String::from);
    let mime = parts.next().map(String::from);
    match (name.as_str(), path) {
        ("quit" | "exit", _) => ConsoleInput::Quit,
        ("image" | "photo", Some(path)) => ConsoleInput::Image { path, mime },
        ("voice" | "audio" | "ptt", Some(path)) => ConsoleInput::Audio { path, mime },
        (other, _) if other.is_empty() => ConsoleInput::Unsupported("command".into()),
        (other, _) => ConsoleInput::Unsupported(other.to_string()),
    }
}

/// Console transport. Single sender, replies printed with a `bot>` prefix.
pub struct ConsoleMessenger {
    sender: UserId,
    lines: Mutex<Lines<BufReader<Stdin>>>,
    out: Mutex<tokio::io::Stdout>,
    next_id: AtomicU64,
}

impl ConsoleMessenger {
    pub fn new(sender: UserId) -> Self {
        Self {
            sender,
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            out: Mutex::new(tokio::io::stdout()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Read a media file. An unreadable file yields no payload (the cycle then reports empty content).
    async fn load_media(path: &str, mime: Option<String>) -> Option<MediaPayload> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Some(MediaPayload {
                bytes,
                mime_type: mime,
            }),
            Err(e) => {
                warn!(path, error = %e, "could not read media file");
                None
            }
        }
    }

    async fn to_body(input: ConsoleInput) -> Option<MessageBody> {
        let body = match input {
            ConsoleInput::Quit => return None,
            ConsoleInput::Text(text) => MessageBody::Text(text),
            ConsoleInput::Image { path, mime } => {
                MessageBody::Image(Self::load_media(&path, mime).await)
            }
            ConsoleInput::Audio { path, mime } => {
                MessageBody::Audio(Self::load_media(&path, mime).await)
            }
            ConsoleInput::Unsupported(kind) => MessageBody::Unsupported { kind },
        };
        Some(body)
    }
}

#[async_trait]
impl MessengerPort for ConsoleMessenger {
    async fn next_message(&self) -> Result<Option<InboundMessage>, DomainError> {
        let line = self
            .lines
            .lock()
            .await
            .next_line()
            .await
            .map_err(|e| DomainError::Messenger(format!("read stdin: {}", e)))?;
        let Some(line) = line else {
            debug!("stdin closed");
            return Ok(None);
        };
        let Some(body) = Self::to_body(parse_line(&line)).await else {
            return Ok(None);
        };
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(Some(InboundMessage::new(
            id.to_string(),
            self.sender.clone(),
            body,
        )))
    }

    async fn send_reply(&self, message: &InboundMessage, text: &str) -> Result<(), DomainError> {
        let mut out = self.out.lock().await;
        out.write_all(format!("bot> [#{}] {}\n", message.id, text).as_bytes())
            .await
            .map_err(|e| DomainError::Messenger(format!("write stdout: {}", e)))?;
        out.flush()
            .await
            .map_err(|e| DomainError::Messenger(format!("flush stdout: {}", e)))
    }
}
