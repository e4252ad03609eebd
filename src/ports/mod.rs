//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: messaging transport feeding the application
//! - Outbound: called by application into infrastructure (storage, remote API, logs)

pub mod inbound;
pub mod outbound;

pub use inbound::MessengerPort;
pub use outbound::{
    AttachmentStorePort, MediaUploadPort, MessageLogPort, TranscriptionPort, WorkflowPort,
};
