//! Implements MediaUploadPort via `POST /files/upload`.

use crate::adapters::workflow::api_client::{ApiClient, transport_error_text, truncate};
use crate::domain::{DomainError, StoredAttachment, UserId};
use crate::ports::MediaUploadPort;
use serde::Deserialize;
use tracing::{debug, info};

const UPLOAD_PATH: &str = "files/upload";

pub struct HttpMediaUploader {
    api: ApiClient,
}

impl HttpMediaUploader {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    id: Option<String>,
}

#[async_trait::async_trait]
impl MediaUploadPort for HttpMediaUploader {
    async fn upload(
        &self,
        attachment: &StoredAttachment,
        user: &UserId,
    ) -> Result<String, DomainError> {
        let form = self.api.attachment_form(attachment, user).await?;
        debug!(file = %attachment.file_name, user = %user, "uploading attachment");

        let response = self.api.post(UPLOAD_PATH, |req| req.multipart(form)).await?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| DomainError::remote(UPLOAD_PATH, Some(status), transport_error_text(&e)))?;
        let parsed: UploadResponse = serde_json::from_str(&text).map_err(|e| {
            DomainError::remote(
                UPLOAD_PATH,
                Some(status),
                format!("invalid response ({}): {}", e, truncate(&text)),
            )
        })?;
        let id = parsed.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            DomainError::remote(UPLOAD_PATH, Some(status), "response has no id")
        })?;

        info!(file = %attachment.file_name, upload_id = %id, "attachment uploaded");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::workflow::api_client::test_support::{client_for, stored_file};
    use mockito::Matcher;

    #[tokio::test]
    async fn returns_upload_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/files/upload")
            .match_header("authorization", "Bearer test-key")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data".into()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="img_1.png""#.into()),
                Matcher::Regex(r#"name="user""#.into()),
                Matcher::Regex("alice".into()),
            ]))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "file-123", "name": "img_1.png"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = stored_file(&dir, "img_1.png", "image/png").await;
        let uploader = HttpMediaUploader::new(client_for(&server));

        let id = uploader.upload(&file, &UserId::new("alice")).await.unwrap();
        assert_eq!(id, "file-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_is_remote_call_failed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/files/upload")
            .with_status(413)
            .with_body("file too large")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = stored_file(&dir, "img_2.jpg", "image/jpeg").await;
        let uploader = HttpMediaUploader::new(client_for(&server));

        match uploader.upload(&file, &UserId::new("bob")).await {
            Err(DomainError::RemoteCallFailed { status, body, .. }) => {
                assert_eq!(status, Some(413));
                assert_eq!(body, "file too large");
            }
            other => panic!("expected RemoteCallFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_id_is_remote_call_failed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/files/upload")
            .with_status(200)
            .with_body(r#"{"name": "x"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = stored_file(&dir, "img_3.jpg", "image/jpeg").await;
        let uploader = HttpMediaUploader::new(client_for(&server));

        let err = uploader.upload(&file, &UserId::new("bob")).await.unwrap_err();
        assert!(matches!(err, DomainError::RemoteCallFailed { .. }));
    }
}
