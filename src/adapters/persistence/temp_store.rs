//! Implements AttachmentStorePort on a local temp directory.
//!
//! Each stored file gets a name unique per call (`<prefix>_<millis>_<random>.<ext>`), so
//! concurrent cycles never collide and no locking is needed.

use crate::domain::{DomainError, StoredAttachment};
use crate::ports::AttachmentStorePort;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tracing::{debug, warn};

/// Temp-directory attachment store.
pub struct TempAttachmentStore {
    dir: PathBuf,
}

impl TempAttachmentStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Create the temp directory. Call once at startup.
    pub async fn prepare(&self) -> Result<(), DomainError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::Attachment(format!("create temp dir: {}", e)))
    }

    fn unique_name(prefix: &str, ext: &str) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("{}_{}_{}.{}", prefix, millis, &suffix[..8], ext)
    }
}

#[async_trait::async_trait]
impl AttachmentStorePort for TempAttachmentStore {
    async fn store(
        &self,
        bytes: &[u8],
        prefix: &str,
        mime_type: &str,
        default_ext: &str,
    ) -> Result<StoredAttachment, DomainError> {
        let ext = extension_for_mime(mime_type).unwrap_or(default_ext);
        let file_name = Self::unique_name(prefix, ext);
        let path = self.dir.join(&file_name);
        let written = fs::write(&path, bytes).await;
        discard_on_error(&path, written).await?;
        debug!(path = %path.display(), size = bytes.len(), "attachment stored");
        Ok(StoredAttachment {
            path,
            file_name,
            mime_type: mime_type.to_string(),
        })
    }

    async fn remove(&self, attachment: &StoredAttachment) -> Result<(), DomainError> {
        match fs::remove_file(&attachment.path).await {
            Ok(()) => {
                debug!(path = %attachment.path.display(), "attachment removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Attachment(format!(
                "remove {}: {}",
                attachment.path.display(),
                e
            ))),
        }
    }
}

/// Map a failed write to `Attachment`, removing whatever part of the file was created.
async fn discard_on_error(path: &Path, written: io::Result<()>) -> Result<(), DomainError> {
    let Err(e) = written else {
        return Ok(());
    };
    match fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "partial attachment removed"),
        Err(rm) if rm.kind() == ErrorKind::NotFound => {}
        Err(rm) => {
            warn!(path = %path.display(), error = %rm, "failed to remove partial attachment")
        }
    }
    Err(DomainError::Attachment(format!("write {}: {}", path.display(), e)))
}

/// File extension for a MIME type, ignoring parameters such as `; codecs=opus`.
pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let ext = match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "audio/ogg" | "audio/opus" => "ogg",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/webm" => "webm",
        "audio/amr" => "amr",
        _ => return None,
    };
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempAttachmentStore::new(dir.path());
        store.prepare().await.unwrap();

        let stored = store
            .store(b"\x89PNG", "img", "image/png", "jpg")
            .await
            .unwrap();
        assert!(stored.file_name.starts_with("img_"));
        assert!(stored.file_name.ends_with(".png"));
        assert_eq!(fs::read(&stored.path).await.unwrap(), b"\x89PNG");

        store.remove(&stored).await.unwrap();
        assert!(!stored.path.exists());
        // second remove is a no-op
        store.remove(&stored).await.unwrap();
    }

    #[tokio::test]
    async fn names_are_unique_within_the_same_millisecond() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempAttachmentStore::new(dir.path());
        let a = store.store(b"a", "audio", "audio/ogg", "ogg").await.unwrap();
        let b = store.store(b"b", "audio", "audio/ogg", "ogg").await.unwrap();
        assert_ne!(a.path, b.path);
    }

    #[tokio::test]
    async fn failed_write_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img_partial.jpg");
        fs::write(&path, b"half").await.unwrap();

        let err = discard_on_error(&path, Err(io::Error::other("no space left on device")))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Attachment(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn store_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempAttachmentStore::new(dir.path().join("absent"));

        let err = store
            .store(b"bytes", "img", "image/png", "jpg")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Attachment(_)));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(extension_for_mime("audio/ogg; codecs=opus"), Some("ogg"));
        assert_eq!(extension_for_mime("IMAGE/JPEG"), Some("jpg"));
        assert_eq!(extension_for_mime("application/octet-stream"), None);
    }
}
