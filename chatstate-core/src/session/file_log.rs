//! JSONL-backed conversation log
//!
//! One file per assistant under the configured collection directory: the
//! first line is a metadata record binding the instructions, each following
//! line is one message. Files are append-only; nothing here rewrites or
//! deletes history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::key;
use super::log::ConversationLog;
use super::message::{Message, Role};
use crate::{Error, Result};

#[derive(Debug, Serialize, Deserialize)]
struct MetadataRecord {
    #[serde(rename = "_type")]
    record_type: String,
    assistant_id: String,
    instructions: String,
    created_at: DateTime<Utc>,
}

const METADATA_TYPE: &str = "metadata";

/// Durable conversation log backed by per-assistant JSONL files
pub struct FileConversationLog {
    log_dir: PathBuf,
    /// Per-assistant append state; guards append ordering and caches the
    /// last assigned timestamp so timestamps never regress
    partitions: Mutex<HashMap<String, Arc<Mutex<PartitionState>>>>,
}

#[derive(Debug, Default)]
struct PartitionState {
    last_timestamp: Option<DateTime<Utc>>,
}

impl FileConversationLog {
    /// Create a log rooted at the given directory
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            partitions: Mutex::new(HashMap::new()),
        }
    }

    fn partition_path(&self, assistant_id: &str) -> Result<PathBuf> {
        key::validate(assistant_id)?;
        Ok(self.log_dir.join(format!("{}.jsonl", assistant_id)))
    }

    async fn partition(&self, assistant_id: &str) -> Arc<Mutex<PartitionState>> {
        let mut partitions = self.partitions.lock().await;
        partitions
            .entry(assistant_id.to_string())
            .or_default()
            .clone()
    }

    fn read_metadata(path: &Path) -> Result<Option<MetadataRecord>> {
        if !path.exists() {
            return Ok(None);
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::storage("read metadata", e))?;
        let first_line = content
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| Error::storage("read metadata", "partition file is empty"))?;
        let record: MetadataRecord = serde_json::from_str(first_line)
            .map_err(|e| Error::storage("read metadata", e))?;
        Ok(Some(record))
    }

    fn read_messages(path: &Path) -> Result<Vec<Message>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::storage("read", e))?;

        let mut messages = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: serde_json::Value =
                serde_json::from_str(line).map_err(|e| Error::storage("read", e))?;
            if value.get("_type").is_some() {
                continue;
            }
            let message: Message =
                serde_json::from_value(value).map_err(|e| Error::storage("read", e))?;
            messages.push(message);
        }
        Ok(messages)
    }

    fn last_timestamp(path: &Path) -> Result<Option<DateTime<Utc>>> {
        let messages = Self::read_messages(path)?;
        if let Some(last) = messages.last() {
            return Ok(Some(last.timestamp_utc));
        }
        Ok(Self::read_metadata(path)?.map(|m| m.created_at))
    }
}

#[async_trait::async_trait]
impl ConversationLog for FileConversationLog {
    async fn create_partition(&self, assistant_id: &str, instructions: &str) -> Result<bool> {
        let path = self.partition_path(assistant_id)?;
        let partition = self.partition(assistant_id).await;
        let _guard = partition.lock().await;

        if path.exists() {
            return Ok(false);
        }

        std::fs::create_dir_all(&self.log_dir).map_err(|e| Error::storage("create", e))?;

        let record = MetadataRecord {
            record_type: METADATA_TYPE.to_string(),
            assistant_id: assistant_id.to_string(),
            instructions: instructions.to_string(),
            created_at: Utc::now(),
        };
        let line = serde_json::to_string(&record).map_err(|e| Error::storage("create", e))?;

        // create_new so a concurrent creator from another process loses
        // cleanly instead of truncating an existing partition
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(Error::storage("create", e)),
        };
        writeln!(file, "{}", line).map_err(|e| Error::storage("create", e))?;

        debug!(assistant_id, "created conversation partition");
        Ok(true)
    }

    async fn exists(&self, assistant_id: &str) -> Result<bool> {
        Ok(self.partition_path(assistant_id)?.exists())
    }

    async fn instructions(&self, assistant_id: &str) -> Result<Option<String>> {
        let path = self.partition_path(assistant_id)?;
        Ok(Self::read_metadata(&path)?.map(|m| m.instructions))
    }

    async fn append(&self, assistant_id: &str, role: Role, content: &str) -> Result<Message> {
        let path = self.partition_path(assistant_id)?;
        let partition = self.partition(assistant_id).await;
        let mut state = partition.lock().await;

        if !path.exists() {
            return Err(Error::SessionNotFound(assistant_id.to_string()));
        }
        if state.last_timestamp.is_none() {
            state.last_timestamp = Self::last_timestamp(&path)?;
        }

        // Clamp so timestamps never regress; equal timestamps are legal
        // and file order is the tiebreak on read
        let now = Utc::now();
        let timestamp_utc = match state.last_timestamp {
            Some(last) if now < last => last,
            _ => now,
        };

        let message = Message {
            role,
            content: content.to_string(),
            timestamp_utc,
        };
        let line = serde_json::to_string(&message).map_err(|e| Error::storage("append", e))?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| Error::storage("append", e))?;
        writeln!(file, "{}", line).map_err(|e| Error::storage("append", e))?;

        state.last_timestamp = Some(timestamp_utc);
        Ok(message)
    }

    async fn read_all(&self, assistant_id: &str) -> Result<Vec<Message>> {
        let path = self.partition_path(assistant_id)?;
        Self::read_messages(&path)
    }

    async fn read_up_to(
        &self,
        assistant_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Message>> {
        let mut messages = self.read_all(assistant_id).await?;
        messages.retain(|m| m.timestamp_utc <= cutoff);
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn log_in(dir: &TempDir) -> FileConversationLog {
        FileConversationLog::new(dir.path().join("chat_state"))
    }

    #[tokio::test]
    async fn test_create_partition_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        assert!(log.create_partition("bot1", "Be concise.").await.unwrap());
        assert!(!log.create_partition("bot1", "Be verbose.").await.unwrap());

        // The first instructions win
        let instructions = log.instructions("bot1").await.unwrap();
        assert_eq!(instructions.as_deref(), Some("Be concise."));
    }

    #[tokio::test]
    async fn test_missing_partition_reads_empty() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        assert!(!log.exists("ghost").await.unwrap());
        assert!(log.read_all("ghost").await.unwrap().is_empty());
        assert!(log.instructions("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_assigns_ordered_timestamps() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        log.create_partition("bot1", "Be concise.").await.unwrap();

        let first = log.append("bot1", Role::User, "2+2?").await.unwrap();
        let second = log.append("bot1", Role::Assistant, "4").await.unwrap();
        assert!(first.timestamp_utc <= second.timestamp_utc);

        let messages = log.read_all("bot1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "2+2?");
        assert_eq!(messages[1].content, "4");
    }

    #[tokio::test]
    async fn test_append_without_partition_fails() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        let err = log.append("ghost", Role::User, "hi").await.unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_read_up_to_boundary_is_inclusive() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        log.create_partition("bot1", "Be concise.").await.unwrap();

        let first = log.append("bot1", Role::User, "2+2?").await.unwrap();
        let second = log.append("bot1", Role::Assistant, "4").await.unwrap();

        let up_to_first = log.read_up_to("bot1", first.timestamp_utc).await.unwrap();
        assert!(up_to_first.iter().any(|m| m.content == "2+2?"));

        let all = log.read_up_to("bot1", second.timestamp_utc).await.unwrap();
        assert_eq!(all.len(), 2);

        let before_everything = log
            .read_up_to("bot1", first.timestamp_utc - chrono::Duration::seconds(1))
            .await
            .unwrap();
        assert!(before_everything.is_empty());
    }

    #[tokio::test]
    async fn test_messages_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let log = log_in(&dir);
            log.create_partition("bot1", "Be concise.").await.unwrap();
            log.append("bot1", Role::User, "2+2?").await.unwrap();
            log.append("bot1", Role::Assistant, "4").await.unwrap();
        }

        let reopened = log_in(&dir);
        assert!(reopened.exists("bot1").await.unwrap());
        let messages = reopened.read_all("bot1").await.unwrap();
        assert_eq!(messages.len(), 2);

        // Appends after reopen keep the ordering invariant
        let next = reopened.append("bot1", Role::User, "3+3?").await.unwrap();
        assert!(messages[1].timestamp_utc <= next.timestamp_utc);
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        let err = log.create_partition("../escape", "x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity(_)));
    }
}
