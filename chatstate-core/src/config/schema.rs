//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration for chatstate
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Conversation log storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Inference provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Assistant defaults
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7071
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Conversation log storage configuration
///
/// The original deployment carried these as process-wide constants
/// (connection setting + collection name); here they are explicit
/// configuration handed to the log at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base data directory
    #[serde(default = "default_storage_dir")]
    pub dir: String,
    /// Collection name; conversation files live in a subdirectory of this name
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_storage_dir() -> String {
    "~/.chatstate/data".to_string()
}

fn default_collection() -> String {
    "chat_state".to_string()
}

impl StorageConfig {
    /// Directory holding the conversation files, with a leading `~/` expanded
    pub fn collection_dir(&self) -> PathBuf {
        let base = match self.dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(rest)),
            None => PathBuf::from(&self.dir),
        };
        base.join(&self.collection)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            collection: default_collection(),
        }
    }
}

/// Inference provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// API key, if the endpoint requires one
    #[serde(default)]
    pub api_key: Option<String>,
    /// Chat model / deployment name
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Assistant defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Instructions used when a create request does not supply its own
    #[serde(default = "default_instructions")]
    pub default_instructions: String,
}

fn default_instructions() -> String {
    "Don't make assumptions about what values to plug into functions.\n\
     Ask for clarification if a user request is ambiguous."
        .to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            default_instructions: default_instructions(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}
