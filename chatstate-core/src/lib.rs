//! Core types and traits for chatstate
//!
//! This crate provides the conversation data model, the durable
//! conversation log, and the configuration and logging plumbing used
//! by the other chatstate components.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use error::{Error, Result};
