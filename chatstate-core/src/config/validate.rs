//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push("server.host must not be empty".to_string());
    }
    if config.server.port == 0 {
        errors.push("server.port must be > 0".to_string());
    }

    if config.storage.dir.trim().is_empty() {
        errors.push("storage.dir must not be empty".to_string());
    }
    if config.storage.collection.trim().is_empty() {
        errors.push("storage.collection must not be empty".to_string());
    } else if !config
        .storage
        .collection
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        errors.push(
            "storage.collection may only contain alphanumerics, '-' and '_'".to_string(),
        );
    }

    if config.provider.api_base.trim().is_empty() {
        errors.push("provider.api_base must not be empty".to_string());
    }
    if config.provider.model.trim().is_empty() {
        errors.push("provider.model must not be empty".to_string());
    }
    if config.provider.max_tokens == 0 {
        errors.push("provider.max_tokens must be > 0".to_string());
    }
    if !(0.0..=2.0).contains(&config.provider.temperature) {
        errors.push("provider.temperature must be in [0.0, 2.0]".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Config(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_bad_collection_rejected() {
        let mut config = Config::default();
        config.storage.collection = "chat/state".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_errors_are_aggregated() {
        let mut config = Config::default();
        config.server.port = 0;
        config.provider.model = String::new();
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("server.port"));
        assert!(err.contains("provider.model"));
    }
}
