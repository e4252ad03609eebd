//! Core domain layer. No external I/O dependencies.
//!
//! Entities, errors and the pure parts of the pipeline (stream extraction, reply text).

pub mod entities;
pub mod errors;
pub mod event_stream;
pub mod reply;

pub use entities::{
    AttachmentKind, AttachmentRef, CanonicalRequest, IMAGE_PLACEHOLDER, InboundMessage,
    MediaPayload, MessageBody, StoredAttachment, TRANSCRIPTION_PLACEHOLDER, TransferMethod,
    UNSUPPORTED_PLACEHOLDER, UserId, WorkflowEvent, WorkflowResult,
};
pub use errors::{DomainError, ExtractionError, FailureKind};
pub use event_stream::{ExtractionOutcome, extract_result};
