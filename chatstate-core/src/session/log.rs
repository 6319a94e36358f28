//! Conversation log interface
//!
//! The durable storage collaborator: an append-only, per-assistant ordered
//! message log with timestamp-based lookup. The log owns timestamp
//! assignment; callers never supply one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::message::{Message, Role};
use crate::Result;

/// Append-only per-assistant message store with timestamp ordering
#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// Create the partition for an assistant, binding its instructions.
    ///
    /// Returns `false` if the partition already existed; the stored
    /// instructions are left untouched in that case.
    async fn create_partition(&self, assistant_id: &str, instructions: &str) -> Result<bool>;

    /// Whether a partition exists for the assistant
    async fn exists(&self, assistant_id: &str) -> Result<bool>;

    /// Instructions bound at creation, or `None` if no partition exists
    async fn instructions(&self, assistant_id: &str) -> Result<Option<String>>;

    /// Append one message and return it as stored.
    ///
    /// The log assigns the timestamp: monotonically non-decreasing within
    /// a partition, ties broken by append order.
    async fn append(&self, assistant_id: &str, role: Role, content: &str) -> Result<Message>;

    /// All messages in order; an empty sequence (not an error) if none yet
    async fn read_all(&self, assistant_id: &str) -> Result<Vec<Message>>;

    /// Messages with `timestamp_utc <= cutoff` (inclusive), in order
    async fn read_up_to(&self, assistant_id: &str, cutoff: DateTime<Utc>)
        -> Result<Vec<Message>>;
}
