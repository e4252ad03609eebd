//! Shared HTTP plumbing for the workflow API: bearer auth, timeouts, error mapping.

use crate::domain::{DomainError, StoredAttachment, UserId};
use crate::shared::config::ApiSettings;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::warn;

/// Max characters of an error body kept in errors and logs.
const ERROR_BODY_LIMIT: usize = 200;

/// Thin wrapper around a reqwest client bound to one API base URL and key.
/// Cheap to clone; all clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    settings: ApiSettings,
}

impl ApiClient {
    /// Build a client whose every request is bounded by `settings.timeout`
    /// (connect, send and full body read).
    pub fn new(settings: ApiSettings) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| DomainError::Unexpected(format!("build HTTP client: {}", e)))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url, path.trim_start_matches('/'))
    }

    /// POST with bearer auth. Transport errors and timeouts become `RemoteCallFailed`.
    pub async fn post(
        &self,
        path: &str,
        build: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    ) -> Result<Response, DomainError> {
        let request = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", self.settings.api_key));
        let response = build(request).send().await.map_err(|e| {
            warn!(endpoint = path, error = %e, "request failed");
            DomainError::remote(path, None, transport_error_text(&e))
        })?;
        check_status(path, response).await
    }

    /// Multipart body with the attachment as `file` and the sender as `user`.
    pub async fn attachment_form(
        &self,
        attachment: &StoredAttachment,
        user: &UserId,
    ) -> Result<Form, DomainError> {
        let bytes = tokio::fs::read(&attachment.path).await.map_err(|e| {
            DomainError::Attachment(format!("read {}: {}", attachment.path.display(), e))
        })?;
        let part = Part::bytes(bytes)
            .file_name(attachment.file_name.clone())
            .mime_str(&attachment.mime_type)
            .map_err(|e| DomainError::Attachment(format!("invalid MIME type: {}", e)))?;
        Ok(Form::new()
            .part("file", part)
            .text("user", user.as_str().to_string()))
    }
}

/// Pass 2xx responses through; otherwise read the body and fail with status + truncated body.
async fn check_status(endpoint: &str, response: Response) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let body = truncate(&text);
    warn!(endpoint, status = %status, body = %body, "workflow API returned error");
    Err(DomainError::remote(endpoint, Some(status.as_u16()), body))
}

/// Error text for a failed send or body read; timeouts are labelled as such.
pub(crate) fn transport_error_text(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out: {}", e)
    } else {
        e.to_string()
    }
}

pub(crate) fn truncate(text: &str) -> String {
    text.chars().take(ERROR_BODY_LIMIT).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::time::Duration;

    pub fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        client_with_timeout(server, Duration::from_secs(5))
    }

    pub fn client_with_timeout(server: &mockito::ServerGuard, timeout: Duration) -> ApiClient {
        ApiClient::new(ApiSettings {
            base_url: server.url(),
            api_key: "test-key".into(),
            timeout,
            input_key: "Project_desc".into(),
        })
        .unwrap()
    }

    pub async fn stored_file(
        dir: &tempfile::TempDir,
        name: &str,
        mime: &str,
    ) -> StoredAttachment {
        let path = dir.path().join(name);
        tokio::fs::write(&path, b"payload").await.unwrap();
        StoredAttachment {
            path,
            file_name: name.into(),
            mime_type: mime.into(),
        }
    }
}
