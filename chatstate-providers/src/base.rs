//! Base trait for inference gateways

use async_trait::async_trait;
use thiserror::Error;

use chatstate_core::session::Message;

/// Error type for gateway operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API error: {0}")]
    ApiError(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Trait for inference gateways
///
/// A single prompt→answer round trip against an external model. Callers do
/// not retry failed calls; retry policy, if any, belongs to the
/// implementation behind this trait.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Produce an answer from instructions, history, and a new prompt.
    ///
    /// `history` is the full ordered conversation, with the new prompt
    /// already appended as its last user turn.
    async fn generate(
        &self,
        instructions: &str,
        history: &[Message],
        prompt: &str,
    ) -> ProviderResult<String>;
}
