//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{CanonicalRequest, DomainError, InboundMessage, StoredAttachment, UserId};

/// Scoped temporary storage for attachment bytes.
#[async_trait::async_trait]
pub trait AttachmentStorePort: Send + Sync {
    /// Persist bytes under a name unique to this call. `prefix` is e.g. "img" or "audio";
    /// `default_ext` is used when the MIME type has no known extension.
    async fn store(
        &self,
        bytes: &[u8],
        prefix: &str,
        mime_type: &str,
        default_ext: &str,
    ) -> Result<StoredAttachment, DomainError>;

    /// Delete a stored attachment. Deleting a file that no longer exists is not an error.
    async fn remove(&self, attachment: &StoredAttachment) -> Result<(), DomainError>;
}

/// Remote content endpoint. Returns the service's handle id for the uploaded file.
#[async_trait::async_trait]
pub trait MediaUploadPort: Send + Sync {
    async fn upload(
        &self,
        attachment: &StoredAttachment,
        user: &UserId,
    ) -> Result<String, DomainError>;
}

/// Remote speech-to-text endpoint.
#[async_trait::async_trait]
pub trait TranscriptionPort: Send + Sync {
    /// Returns the transcribed text, or a fixed placeholder when the service answers without text.
    async fn transcribe(
        &self,
        attachment: &StoredAttachment,
        user: &UserId,
    ) -> Result<String, DomainError>;
}

/// Remote workflow endpoint, streaming mode.
#[async_trait::async_trait]
pub trait WorkflowPort: Send + Sync {
    /// Run the workflow and return the complete raw event stream once the response ends.
    async fn run(&self, request: &CanonicalRequest) -> Result<String, DomainError>;
}

/// Append-only log of inbound messages.
#[async_trait::async_trait]
pub trait MessageLogPort: Send + Sync {
    async fn append(&self, message: &InboundMessage) -> Result<(), DomainError>;
}
