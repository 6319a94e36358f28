//! Configuration loading and management

use super::schema::Config;
use super::validate::validate_config;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".chatstate"))
            .unwrap_or_else(|| PathBuf::from(".chatstate"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from file and environment
    pub fn load(&self) -> crate::Result<Config> {
        let config_path = self.config_dir.join("config.json");
        let mut merged = serde_json::to_value(Config::default())?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let file_value: Value = serde_json::from_str(&content)?;
            merge_values(&mut merged, file_value);
        }

        apply_alias_overrides(&mut merged);
        apply_path_overrides(&mut merged);

        let config: Config = serde_json::from_value(merged)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let config_path = self.config_dir.join("config.json");
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    merge_values(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn parse_env_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Value::Number(v.into());
    }
    if let Ok(v) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(v) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

fn set_path_value(root: &mut Value, path: &[String], value: Value) {
    if path.is_empty() {
        *root = value;
        return;
    }

    let mut current = root;
    for segment in &path[..path.len() - 1] {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let map = current.as_object_mut().expect("object ensured");
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Some(map) = current.as_object_mut() {
        map.insert(path[path.len() - 1].clone(), value);
    }
}

fn apply_alias_overrides(config: &mut Value) {
    let aliases = [
        ("OPENAI_API_KEY", "provider.api_key"),
        ("OPENAI_API_BASE", "provider.api_base"),
        ("CHATSTATE_MODEL", "provider.model"),
        ("CHATSTATE_STORAGE_DIR", "storage.dir"),
        ("CHATSTATE_COLLECTION", "storage.collection"),
        ("CHATSTATE_PORT", "server.port"),
    ];

    for (var, path) in aliases {
        if let Ok(raw) = std::env::var(var) {
            if raw.trim().is_empty() {
                continue;
            }
            let segments: Vec<String> = path.split('.').map(|s| s.to_string()).collect();
            set_path_value(config, &segments, parse_env_value(&raw));
        }
    }
}

/// `CHATSTATE_SERVER__PORT=8080` style overrides: double underscore
/// separates path segments, segments are lowercased.
fn apply_path_overrides(config: &mut Value) {
    for (key, raw) in std::env::vars() {
        let Some(rest) = key.strip_prefix("CHATSTATE_") else {
            continue;
        };
        if !rest.contains("__") {
            continue;
        }
        let segments: Vec<String> = rest
            .split("__")
            .map(|s| s.to_ascii_lowercase())
            .collect();
        if segments.iter().any(|s| s.is_empty()) {
            continue;
        }
        set_path_value(config, &segments, parse_env_value(&raw));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_when_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();
        assert_eq!(config.server.port, 7071);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_dir(temp_dir.path());

        let mut config = Config::default();
        config.provider.model = "gpt-4o".to_string();
        loader.save(&config).unwrap();

        let reloaded = loader.load().unwrap();
        assert_eq!(reloaded.provider.model, "gpt-4o");
    }

    #[test]
    fn test_file_overrides_merge_over_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.json"),
            r#"{"storage": {"collection": "ChatState"}}"#,
        )
        .unwrap();

        let loader = ConfigLoader::with_dir(temp_dir.path());
        let config = loader.load().unwrap();
        assert_eq!(config.storage.collection, "ChatState");
        // Untouched sections keep their defaults
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_parse_env_value_types() {
        assert_eq!(parse_env_value("8080"), Value::Number(8080.into()));
        assert_eq!(parse_env_value("true"), Value::Bool(true));
        assert_eq!(
            parse_env_value("hello"),
            Value::String("hello".to_string())
        );
    }

    #[test]
    fn test_set_path_value_creates_nested_objects() {
        let mut root = Value::Object(Map::new());
        set_path_value(
            &mut root,
            &["server".to_string(), "port".to_string()],
            Value::Number(9000.into()),
        );
        assert_eq!(root["server"]["port"], Value::Number(9000.into()));
    }
}
