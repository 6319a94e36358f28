//! Inference gateway integrations for chatstate
//!
//! This crate provides the gateway abstraction the session manager talks to
//! and an OpenAI-compatible HTTP implementation of it.

pub mod base;
pub mod openai;

pub use base::{InferenceGateway, ProviderError, ProviderResult};
pub use openai::OpenAiClient;
