//! Domain entities. Pure data structures for one relay cycle.
//!
//! No transport/HTTP types here — adapters map into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Query used when an image arrives; the workflow sees the attachment instead of text.
pub const IMAGE_PLACEHOLDER: &str = "[Image]";

/// Query used for message kinds the bridge cannot forward.
pub const UNSUPPORTED_PLACEHOLDER: &str = "[Unsupported message type]";

/// Query used when transcription succeeds but the service returns no text.
pub const TRANSCRIPTION_PLACEHOLDER: &str = "[Voice transcription failed]";

/// Opaque identifier of the sender, forwarded to the workflow API as `user`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binary media delivered with a message.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

/// Closed set of message kinds the bridge knows how to normalize.
///
/// `None` media means the transport could not fetch the payload.
#[derive(Debug, Clone)]
pub enum MessageBody {
    Text(String),
    Image(Option<MediaPayload>),
    Audio(Option<MediaPayload>),
    /// Anything else (stickers, locations, documents...). Carries the transport's kind label.
    Unsupported { kind: String },
}

impl MessageBody {
    /// Short label used in logs.
    pub fn kind_label(&self) -> &str {
        match self {
            MessageBody::Text(_) => "text",
            MessageBody::Image(_) => "image",
            MessageBody::Audio(_) => "audio",
            MessageBody::Unsupported { kind } => kind,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            MessageBody::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// One message received from the messaging transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Transport-specific id, used to address the reply.
    pub id: String,
    pub sender: UserId,
    pub body: MessageBody,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(id: impl Into<String>, sender: UserId, body: MessageBody) -> Self {
        Self {
            id: id.into(),
            sender,
            body,
            received_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
}

/// How the workflow API should resolve an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferMethod {
    /// The file was uploaded beforehand and is referenced by its handle id.
    #[serde(rename = "local_file")]
    RemoteHandle,
}

/// Reference to an uploaded attachment, as sent in the workflow request `files` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub transfer_method: TransferMethod,
    #[serde(rename = "upload_file_id")]
    pub handle_id: String,
}

impl AttachmentRef {
    pub fn uploaded_image(handle_id: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Image,
            transfer_method: TransferMethod::RemoteHandle,
            handle_id: handle_id.into(),
        }
    }
}

/// Normalized request handed to the workflow dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    pub query: String,
    pub user: UserId,
    pub attachments: Vec<AttachmentRef>,
    /// Empty string starts a new conversation.
    pub conversation_id: String,
}

/// Attachment persisted in the temporary store. Must be removed once consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    pub path: std::path::PathBuf,
    pub file_name: String,
    pub mime_type: String,
}

/// Structured output of a successful workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResult {
    #[serde(rename = "Package")]
    pub package: String,
    #[serde(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "Language")]
    pub language: String,
}

/// One `data: <json>` frame of the workflow event stream.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowEvent {
    #[serde(rename = "event")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}
