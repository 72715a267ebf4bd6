//! Configuration validation rules.
//!
//! `AppConfig` fields that select the store are rejected when unusable.
//! Invalidation settings are never rejected: malformed values fall back to
//! their defaults instead.

use crate::config::{AppConfig, CacheConfig, DEFAULT_PARAM};
use thiserror::Error;

/// Characters that would corrupt the versioned query string.
const QUERY_DELIMITERS: &[char] = &['?', '&', '=', '#'];

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `session` is empty
    /// - `db_path` is set to an empty path
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.is_empty() {
            return Err(ConfigError::Invalid { field: "session".into(), reason: "must not be empty".into() });
        }

        if let Some(path) = &self.db_path
            && path.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid { field: "db_path".into(), reason: "must not be empty".into() });
        }

        Ok(())
    }
}

impl CacheConfig {
    /// Substitute defaults for malformed fields.
    ///
    /// - An empty `param`, or one containing a query delimiter, becomes `rev`.
    /// - Patterns with an empty `url` are dropped so they never match.
    pub fn normalized(mut self) -> Self {
        if self.param.is_empty() || self.param.contains(QUERY_DELIMITERS) {
            tracing::warn!(param = %self.param, "unusable revision parameter; falling back to {DEFAULT_PARAM}");
            self.param = DEFAULT_PARAM.into();
        }

        let before = self.base_api_urls.len();
        self.base_api_urls.retain(|pattern| !pattern.url.is_empty());
        if self.base_api_urls.len() != before {
            tracing::warn!(dropped = before - self.base_api_urls.len(), "ignoring base API URLs with an empty url");
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaseUrlPattern;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_session() {
        let config = AppConfig { session: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "session"));
    }

    #[test]
    fn test_validate_empty_db_path() {
        let config = AppConfig { db_path: Some(PathBuf::new()), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "db_path"));
    }

    #[test]
    fn test_validate_db_path() {
        let config = AppConfig { db_path: Some(PathBuf::from("./revcache.sqlite")), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_normalized_keeps_valid_config() {
        let config = CacheConfig {
            base_api_urls: vec![BaseUrlPattern::new("http://localhost/api")],
            log_enabled: true,
            param: "v".into(),
        };
        assert_eq!(config.clone().normalized(), config);
    }

    #[test]
    fn test_normalized_param_with_delimiter() {
        for param in ["", "a=b", "rev&x", "r?", "#"] {
            let config = CacheConfig { param: param.into(), ..Default::default() };
            assert_eq!(config.normalized().param, "rev", "param {param:?}");
        }
    }

    #[test]
    fn test_normalized_drops_empty_patterns() {
        let config = CacheConfig {
            base_api_urls: vec![BaseUrlPattern::new(""), BaseUrlPattern::strict("http://localhost/api")],
            ..Default::default()
        };
        let config = config.normalized();
        assert_eq!(config.base_api_urls, vec![BaseUrlPattern::strict("http://localhost/api")]);
    }
}
