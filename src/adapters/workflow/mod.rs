//! Workflow API adapters. Implement upload, transcription and workflow ports over HTTP.
//!
//! Provides the reqwest-based adapters and a mock adapter for running without credentials.

pub mod api_client;
pub mod dispatcher;
pub mod mock_adapter;
pub mod transcriber;
pub mod uploader;

pub use api_client::ApiClient;
pub use dispatcher::HttpWorkflowDispatcher;
pub use mock_adapter::MockWorkflowAdapter;
pub use transcriber::HttpSpeechTranscriber;
pub use uploader::HttpMediaUploader;
