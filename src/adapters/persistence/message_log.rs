//! Implements MessageLogPort. Append-only plaintext log of inbound messages.
//!
//! One line per message: `[<RFC3339 UTC>] <sender> (<kind>): <text>`.

use crate::domain::{DomainError, InboundMessage};
use crate::ports::MessageLogPort;
use chrono::SecondsFormat;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub const MESSAGE_LOG_FILE: &str = "messages.log";

/// File-backed message log.
pub struct FileMessageLog {
    path: PathBuf,
}

impl FileMessageLog {
    pub fn new(log_dir: impl AsRef<Path>) -> Self {
        Self {
            path: log_dir.as_ref().join(MESSAGE_LOG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format_entry(message: &InboundMessage) -> String {
        // Keep one entry per line even for multi-line texts
        let text = message.body.text().unwrap_or_default().replace('\n', " ");
        format!(
            "[{}] {} ({}): {}\n",
            message
                .received_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            message.sender,
            message.body.kind_label(),
            text
        )
    }
}

#[async_trait::async_trait]
impl MessageLogPort for FileMessageLog {
    /// Single write per entry on an append-mode file, so concurrent tasks do not interleave lines.
    async fn append(&self, message: &InboundMessage) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::MessageLog(e.to_string()))?;
        }
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| DomainError::MessageLog(e.to_string()))?;
        f.write_all(Self::format_entry(message).as_bytes())
            .await
            .map_err(|e| DomainError::MessageLog(e.to_string()))?;
        f.flush()
            .await
            .map_err(|e| DomainError::MessageLog(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageBody, UserId};

    #[tokio::test]
    async fn appends_one_line_per_message() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileMessageLog::new(dir.path().join("logs"));

        let text = InboundMessage::new(
            "1",
            UserId::new("alice"),
            MessageBody::Text("hello\nworld".into()),
        );
        let image = InboundMessage::new("2", UserId::new("bob"), MessageBody::Image(None));
        log.append(&text).await.unwrap();
        log.append(&image).await.unwrap();

        let content = fs::read_to_string(log.path()).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("alice (text): hello world"));
        assert!(lines[1].ends_with("bob (image): "));
    }
}
