//! Local filesystem adapters: temporary attachment files and the message log.

pub mod message_log;
pub mod temp_store;

pub use message_log::FileMessageLog;
pub use temp_store::TempAttachmentStore;
