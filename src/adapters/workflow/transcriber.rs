//! Implements TranscriptionPort via `POST /audio-to-text`.

use crate::adapters::workflow::api_client::{ApiClient, transport_error_text};
use crate::domain::{DomainError, StoredAttachment, TRANSCRIPTION_PLACEHOLDER, UserId};
use crate::ports::TranscriptionPort;
use serde::Deserialize;
use tracing::{info, warn};

const TRANSCRIBE_PATH: &str = "audio-to-text";

pub struct HttpSpeechTranscriber {
    api: ApiClient,
}

impl HttpSpeechTranscriber {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[derive(Deserialize, Default)]
struct TranscriptionResponse {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait::async_trait]
impl TranscriptionPort for HttpSpeechTranscriber {
    async fn transcribe(
        &self,
        attachment: &StoredAttachment,
        user: &UserId,
    ) -> Result<String, DomainError> {
        let form = self.api.attachment_form(attachment, user).await?;
        let response = self
            .api
            .post(TRANSCRIBE_PATH, |req| req.multipart(form))
            .await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| {
                DomainError::remote(TRANSCRIBE_PATH, Some(status), transport_error_text(&e))
            })?;

        // A 2xx without usable text keeps the pipeline moving with a placeholder query.
        let parsed: TranscriptionResponse = serde_json::from_str(&body).unwrap_or_default();
        match parsed.text.filter(|t| !t.is_empty()) {
            Some(text) => {
                info!(file = %attachment.file_name, chars = text.chars().count(), "audio transcribed");
                Ok(text)
            }
            None => {
                warn!(file = %attachment.file_name, "transcription returned no text");
                Ok(TRANSCRIPTION_PLACEHOLDER.to_string())
            }
        }
    }
}
