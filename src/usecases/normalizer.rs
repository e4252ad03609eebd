//! Request normalizer. Turns one inbound message into one canonical workflow request.
//!
//! Media is stored in the attachment store only for the duration of the remote call and
//! removed on every exit path, success or failure.

use crate::domain::{
    AttachmentRef, CanonicalRequest, DomainError, IMAGE_PLACEHOLDER, InboundMessage,
    MediaPayload, MessageBody, StoredAttachment, UNSUPPORTED_PLACEHOLDER,
};
use crate::ports::{AttachmentStorePort, MediaUploadPort, TranscriptionPort};
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
const DEFAULT_AUDIO_MIME: &str = "audio/ogg";

pub struct RequestNormalizer {
    store: Arc<dyn AttachmentStorePort>,
    uploader: Arc<dyn MediaUploadPort>,
    transcriber: Arc<dyn TranscriptionPort>,
}

impl RequestNormalizer {
    pub fn new(
        store: Arc<dyn AttachmentStorePort>,
        uploader: Arc<dyn MediaUploadPort>,
        transcriber: Arc<dyn TranscriptionPort>,
    ) -> Self {
        Self {
            store,
            uploader,
            transcriber,
        }
    }

    /// Build the canonical request. Fails with `EmptyContent` when no query remains,
    /// so the workflow is never called for an empty message.
    pub async fn normalize(
        &self,
        message: &InboundMessage,
    ) -> Result<CanonicalRequest, DomainError> {
        let user = &message.sender;
        let mut attachments = Vec::new();

        let query = match &message.body {
            MessageBody::Text(text) => text.clone(),
            MessageBody::Image(Some(media)) => {
                let handle_id = self
                    .with_stored(media, "img", DEFAULT_IMAGE_MIME, "jpg", |stored| async move {
                        self.uploader.upload(&stored, user).await
                    })
                    .await?;
                attachments.push(AttachmentRef::uploaded_image(handle_id));
                IMAGE_PLACEHOLDER.to_string()
            }
            MessageBody::Audio(Some(media)) => {
                self.with_stored(media, "audio", DEFAULT_AUDIO_MIME, "ogg", |stored| async move {
                    self.transcriber.transcribe(&stored, user).await
                })
                .await?
            }
            MessageBody::Image(None) | MessageBody::Audio(None) => {
                debug!(kind = message.body.kind_label(), "media payload unavailable");
                String::new()
            }
            MessageBody::Unsupported { kind } => {
                debug!(kind = %kind, "unsupported message kind");
                UNSUPPORTED_PLACEHOLDER.to_string()
            }
        };

        if query.is_empty() {
            return Err(DomainError::EmptyContent);
        }

        Ok(CanonicalRequest {
            query,
            user: user.clone(),
            attachments,
            conversation_id: String::new(),
        })
    }

    /// Store `media`, run `op` on the stored copy, then remove it whatever `op` returned.
    async fn with_stored<T, F, Fut>(
        &self,
        media: &MediaPayload,
        prefix: &str,
        default_mime: &str,
        default_ext: &str,
        op: F,
    ) -> Result<T, DomainError>
    where
        F: FnOnce(StoredAttachment) -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let mime = media.mime_type.as_deref().unwrap_or(default_mime);
        let stored = self
            .store
            .store(&media.bytes, prefix, mime, default_ext)
            .await?;
        let result = op(stored.clone()).await;
        if let Err(e) = self.store.remove(&stored).await {
            warn!(path = %stored.path.display(), error = %e, "failed to remove temp attachment");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::TempAttachmentStore;
    use crate::domain::{TRANSCRIPTION_PLACEHOLDER, TransferMethod, UserId};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records the paths it was handed and whether they existed during the call.
    #[derive(Default)]
    struct FakeRemote {
        seen: Mutex<Vec<(PathBuf, bool)>>,
        fail: bool,
        transcript: Option<String>,
    }

    impl FakeRemote {
        fn record(&self, attachment: &StoredAttachment) {
            self.seen
                .lock()
                .unwrap()
                .push((attachment.path.clone(), attachment.path.exists()));
        }

        fn seen(&self) -> Vec<(PathBuf, bool)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl MediaUploadPort for FakeRemote {
        async fn upload(
            &self,
            attachment: &StoredAttachment,
            _user: &UserId,
        ) -> Result<String, DomainError> {
            self.record(attachment);
            if self.fail {
                return Err(DomainError::remote("files/upload", Some(500), "boom"));
            }
            Ok("file-42".into())
        }
    }

    #[async_trait::async_trait]
    impl TranscriptionPort for FakeRemote {
        async fn transcribe(
            &self,
            attachment: &StoredAttachment,
            _user: &UserId,
        ) -> Result<String, DomainError> {
            self.record(attachment);
            if self.fail {
                return Err(DomainError::remote("audio-to-text", None, "timed out"));
            }
            Ok(self
                .transcript
                .clone()
                .unwrap_or_else(|| TRANSCRIPTION_PLACEHOLDER.to_string()))
        }
    }

    fn normalizer(dir: &tempfile::TempDir, remote: Arc<FakeRemote>) -> RequestNormalizer {
        RequestNormalizer::new(
            Arc::new(TempAttachmentStore::new(dir.path())),
            remote.clone(),
            remote,
        )
    }

    fn message(body: MessageBody) -> InboundMessage {
        InboundMessage::new("m1", UserId::new("alice"), body)
    }

    fn media(mime: &str) -> Option<MediaPayload> {
        Some(MediaPayload {
            bytes: b"bytes".to_vec(),
            mime_type: Some(mime.into()),
        })
    }

    fn dir_is_empty(dir: &tempfile::TempDir) -> bool {
        std::fs::read_dir(dir.path()).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn text_is_forwarded_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let n = normalizer(&dir, remote.clone());

        let req = n
            .normalize(&message(MessageBody::Text("  hi there ".into())))
            .await
            .unwrap();

        assert_eq!(req.query, "  hi there ");
        assert_eq!(req.user, UserId::new("alice"));
        assert!(req.attachments.is_empty());
        assert!(req.conversation_id.is_empty());
        assert!(remote.seen().is_empty());
    }

    #[tokio::test]
    async fn image_is_uploaded_and_temp_file_removed() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let n = normalizer(&dir, remote.clone());

        let req = n
            .normalize(&message(MessageBody::Image(media("image/png"))))
            .await
            .unwrap();

        assert_eq!(req.query, IMAGE_PLACEHOLDER);
        assert_eq!(req.attachments.len(), 1);
        assert_eq!(req.attachments[0].handle_id, "file-42");
        assert_eq!(req.attachments[0].transfer_method, TransferMethod::RemoteHandle);

        let seen = remote.seen();
        assert_eq!(seen.len(), 1);
        let (path, existed_during_upload) = &seen[0];
        assert!(existed_during_upload);
        assert_eq!(path.extension().unwrap(), "png");
        assert!(!path.exists());
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn failed_upload_still_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote {
            fail: true,
            ..Default::default()
        });
        let n = normalizer(&dir, remote.clone());

        let err = n
            .normalize(&message(MessageBody::Image(media("image/jpeg"))))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::RemoteCallFailed { .. }));
        assert_eq!(remote.seen().len(), 1);
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn audio_becomes_transcribed_query_without_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote {
            transcript: Some("I need a data plan".into()),
            ..Default::default()
        });
        let n = normalizer(&dir, remote.clone());

        let req = n
            .normalize(&message(MessageBody::Audio(media("audio/ogg; codecs=opus"))))
            .await
            .unwrap();

        assert_eq!(req.query, "I need a data plan");
        assert!(req.attachments.is_empty());
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn failed_transcription_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote {
            fail: true,
            ..Default::default()
        });
        let n = normalizer(&dir, remote);

        let result = n
            .normalize(&message(MessageBody::Audio(media("audio/mpeg"))))
            .await;

        assert!(result.is_err());
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn unsupported_kind_uses_placeholder_without_io() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let n = normalizer(&dir, remote.clone());

        let req = n
            .normalize(&message(MessageBody::Unsupported {
                kind: "sticker".into(),
            }))
            .await
            .unwrap();

        assert_eq!(req.query, UNSUPPORTED_PLACEHOLDER);
        assert!(req.attachments.is_empty());
        assert!(remote.seen().is_empty());
    }

    #[tokio::test]
    async fn whitespace_text_is_not_empty() {
        let dir = tempfile::tempdir().unwrap();
        let n = normalizer(&dir, Arc::new(FakeRemote::default()));

        let req = n
            .normalize(&message(MessageBody::Text("   ".into())))
            .await
            .unwrap();

        assert_eq!(req.query, "   ");
    }

    #[tokio::test]
    async fn empty_content_fails() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let n = normalizer(&dir, remote.clone());

        for body in [
            MessageBody::Text(String::new()),
            MessageBody::Image(None),
            MessageBody::Audio(None),
        ] {
            let err = n.normalize(&message(body)).await.unwrap_err();
            assert!(matches!(err, DomainError::EmptyContent));
        }
        assert!(remote.seen().is_empty());
    }
}
