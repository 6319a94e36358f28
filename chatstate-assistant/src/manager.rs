//! Session manager: creation, posting, and point-in-time queries
//!
//! Orchestrates the conversation log and the inference gateway. The manager
//! is stateless between calls, so any number of instances can serve the
//! same log concurrently.
//!
//! Concurrent posts for one assistant are not serialized: each post
//! independently reads history, calls the gateway, and appends. Two
//! in-flight posts may therefore read the same prior history, and their
//! prompt/answer pairs land in whatever order the log appends them. This is
//! an accepted limitation, not a defect; operations for different
//! assistants are fully independent.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use chatstate_core::session::{key, AssistantState, ConversationLog, Message, Role};
use chatstate_core::{Error, Result};
use chatstate_providers::InferenceGateway;

/// Manages assistant conversation sessions
pub struct SessionManager {
    log: Arc<dyn ConversationLog>,
    gateway: Arc<dyn InferenceGateway>,
}

impl SessionManager {
    /// Create a new session manager over its two collaborators
    pub fn new(log: Arc<dyn ConversationLog>, gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { log, gateway }
    }

    /// Create a session for an assistant, binding its instructions.
    ///
    /// Idempotent: if the session already exists this succeeds without
    /// touching the stored instructions or the conversation history, so a
    /// retrying client can never clobber a live session.
    pub async fn create(&self, assistant_id: &str, instructions: &str) -> Result<()> {
        key::validate(assistant_id)?;

        let created = self
            .log
            .create_partition(assistant_id, instructions)
            .await?;
        if created {
            info!(assistant_id, "created assistant session");
        } else {
            debug!(
                assistant_id,
                "create for existing session, keeping stored instructions"
            );
        }
        Ok(())
    }

    /// Post a prompt and return the generated assistant message.
    ///
    /// The session must already exist; posting never creates one, so
    /// instruction binding stays an explicit step. The user prompt is
    /// appended before the gateway call and is not rolled back if the call
    /// fails: a later query then shows the prompt unanswered instead of
    /// losing the turn.
    pub async fn post(&self, assistant_id: &str, prompt: &str) -> Result<Message> {
        // An id that cannot be a storage key cannot have a session either
        if key::validate(assistant_id).is_err() || !self.log.exists(assistant_id).await? {
            return Err(Error::SessionNotFound(assistant_id.to_string()));
        }

        self.log.append(assistant_id, Role::User, prompt).await?;

        let instructions = self
            .log
            .instructions(assistant_id)
            .await?
            .ok_or_else(|| Error::SessionNotFound(assistant_id.to_string()))?;
        let history = self.log.read_all(assistant_id).await?;

        // The single blocking step of the operation
        let answer = match self.gateway.generate(&instructions, &history, prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(assistant_id, error = %e, "inference failed, prompt remains recorded");
                return Err(Error::inference("post", e));
            }
        };

        let message = self
            .log
            .append(assistant_id, Role::Assistant, &answer)
            .await?;
        debug!(assistant_id, "recorded assistant answer");
        Ok(message)
    }

    /// Read the session state, optionally bounded at a point in time.
    ///
    /// With `at_or_before` set, the history is the prefix of messages with
    /// `timestamp_utc <= at_or_before` (inclusive); a boundary before the
    /// first message yields an empty history, not an error. Pure read.
    pub async fn query(
        &self,
        assistant_id: &str,
        at_or_before: Option<DateTime<Utc>>,
    ) -> Result<AssistantState> {
        if key::validate(assistant_id).is_err() {
            return Err(Error::SessionNotFound(assistant_id.to_string()));
        }

        let instructions = self
            .log
            .instructions(assistant_id)
            .await?
            .ok_or_else(|| Error::SessionNotFound(assistant_id.to_string()))?;

        let messages = match at_or_before {
            Some(cutoff) => self.log.read_up_to(assistant_id, cutoff).await?,
            None => self.log.read_all(assistant_id).await?,
        };

        Ok(AssistantState::new(assistant_id, instructions, messages))
    }
}
