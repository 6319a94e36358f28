//! Conversation sessions
//!
//! The durable data model for assistant conversations: message records,
//! point-in-time state views, and the append-only per-assistant log.

pub mod file_log;
pub mod key;
pub mod log;
pub mod message;

pub use file_log::FileConversationLog;
pub use log::ConversationLog;
pub use message::{AssistantState, Message, Role};
