//! Cache configuration with layered loading.
//!
//! [`CacheConfig`] is the invalidation surface: which base API URLs are
//! revisioned, whether invalidations are logged, and the query parameter that
//! carries the revision. [`AppConfig`] wraps it with the store settings and is
//! loaded with figment from:
//!
//! 1. Environment variables (REVCACHE_*)
//! 2. TOML config file (if REVCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};

use crate::store::DEFAULT_SESSION;

mod registry;
mod validation;

pub use registry::ConfigRegistry;
pub use validation::ConfigError;

/// Default name of the query parameter carrying the revision.
pub const DEFAULT_PARAM: &str = "rev";

/// A configured base API URL.
///
/// Non-strict patterns match any request URL that contains `url`; strict
/// patterns only rewrite reads whose URL is exactly `url`.
///
/// Deserializes from either a bare string (non-strict) or `{ url, strict }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PatternRepr")]
pub struct BaseUrlPattern {
    pub url: String,
    pub strict: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PatternRepr {
    Url(String),
    Full {
        url: String,
        #[serde(default)]
        strict: bool,
    },
}

impl From<PatternRepr> for BaseUrlPattern {
    fn from(repr: PatternRepr) -> Self {
        match repr {
            PatternRepr::Url(url) => Self { url, strict: false },
            PatternRepr::Full { url, strict } => Self { url, strict },
        }
    }
}

impl BaseUrlPattern {
    /// A containment pattern.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), strict: false }
    }

    /// An exact-match pattern for the read path.
    pub fn strict(url: impl Into<String>) -> Self {
        Self { url: url.into(), strict: true }
    }
}

impl From<&str> for BaseUrlPattern {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// Invalidation settings.
///
/// Every field falls back to its default when omitted, null or of the wrong
/// type, so any JSON object yields a complete configuration. Malformed entries
/// inside `base_api_urls` are skipped individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Base API URL patterns, in match order.
    #[serde(default, alias = "baseApiUrls", deserialize_with = "lenient_patterns")]
    pub base_api_urls: Vec<BaseUrlPattern>,

    /// Log one line per invalidated URL.
    #[serde(default, alias = "logEnabled", deserialize_with = "lenient_log_enabled")]
    pub log_enabled: bool,

    /// Query parameter name used in versioned URLs.
    #[serde(default = "default_param", deserialize_with = "lenient_param")]
    pub param: String,
}

/// A value that either has the expected shape or is discarded.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Malformed(IgnoredAny),
}

impl<T> Lenient<T> {
    fn or_warn(self, field: &str) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Malformed(_) => {
                tracing::warn!(field, "malformed cache configuration value; using the default");
                None
            }
        }
    }
}

fn lenient_patterns<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<BaseUrlPattern>, D::Error> {
    let patterns = Lenient::<Vec<Lenient<BaseUrlPattern>>>::deserialize(deserializer)?
        .or_warn("base_api_urls")
        .unwrap_or_default();

    Ok(patterns.into_iter().filter_map(|pattern| pattern.or_warn("base_api_urls[]")).collect())
}

fn lenient_log_enabled<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Lenient::<bool>::deserialize(deserializer)?.or_warn("log_enabled").unwrap_or_default())
}

fn lenient_param<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Lenient::<String>::deserialize(deserializer)?.or_warn("param").unwrap_or_else(default_param))
}

fn default_param() -> String {
    DEFAULT_PARAM.into()
}

fn default_session() -> String {
    DEFAULT_SESSION.into()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { base_api_urls: Vec::new(), log_enabled: false, param: default_param() }
    }
}

impl CacheConfig {
    /// Parse a (possibly partial) JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` only if the document is not valid JSON
    /// or is not an object. Malformed fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        Ok(config.normalized())
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (REVCACHE_*, `__` separates nested keys)
/// 2. TOML config file (if REVCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite revision store.
    ///
    /// Set via REVCACHE_DB_PATH. When unset, revisions live in memory for the
    /// lifetime of the process.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Key under which the revision map is persisted.
    ///
    /// Set via REVCACHE_SESSION environment variable.
    #[serde(default = "default_session")]
    pub session: String,

    /// Invalidation settings (`[cache]` table, REVCACHE_CACHE__* variables).
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { db_path: None, session: default_session(), cache: CacheConfig::default() }
    }
}

impl AppConfig {
    /// Layered figment used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("REVCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("REVCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Extract, validate and normalize a configuration from `figment`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(Self { cache: config.cache.normalized(), ..config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_config() {
        let config = CacheConfig::default();
        assert!(config.base_api_urls.is_empty());
        assert!(!config.log_enabled);
        assert_eq!(config.param, "rev");
    }

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();
        assert!(config.db_path.is_none());
        assert_eq!(config.session, "revisions");
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_from_json_empty_object_uses_defaults() {
        let config = CacheConfig::from_json("{}").unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_from_json_partial() {
        let config = CacheConfig::from_json(r#"{"param": "v"}"#).unwrap();
        assert_eq!(config.param, "v");
        assert!(config.base_api_urls.is_empty());
        assert!(!config.log_enabled);
    }

    #[test]
    fn test_from_json_accepts_bare_and_full_patterns() {
        let config = CacheConfig::from_json(
            r#"{
                "baseApiUrls": [
                    "http://localhost:8080/api/resources",
                    {"url": "http://localhost:8080/api/users", "strict": true},
                    {"url": "http://localhost:8080/api/items"}
                ],
                "logEnabled": true
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.base_api_urls,
            vec![
                BaseUrlPattern::new("http://localhost:8080/api/resources"),
                BaseUrlPattern::strict("http://localhost:8080/api/users"),
                BaseUrlPattern::new("http://localhost:8080/api/items"),
            ]
        );
        assert!(config.log_enabled);
        assert_eq!(config.param, "rev");
    }

    #[test]
    fn test_from_json_null_fields_use_defaults() {
        let config = CacheConfig::from_json(r#"{"param": null, "baseApiUrls": null, "logEnabled": null}"#).unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_from_json_wrong_types_use_defaults() {
        for json in [r#"{"param": 5}"#, r#"{"logEnabled": "yes"}"#, r#"{"baseApiUrls": "http://localhost/api"}"#] {
            let config = CacheConfig::from_json(json).unwrap();
            assert_eq!(config, CacheConfig::default(), "{json}");
        }
    }

    #[test]
    fn test_from_json_malformed_field_keeps_others() {
        let config = CacheConfig::from_json(
            r#"{"param": ["v"], "logEnabled": true, "baseApiUrls": ["http://localhost/api"]}"#,
        )
        .unwrap();

        assert_eq!(config.param, "rev");
        assert!(config.log_enabled);
        assert_eq!(config.base_api_urls, vec![BaseUrlPattern::new("http://localhost/api")]);
    }

    #[test]
    fn test_from_json_skips_malformed_patterns() {
        let config = CacheConfig::from_json(
            r#"{"baseApiUrls": [42, "http://localhost/api", {"strict": true}, {"url": "http://localhost/me", "strict": true}]}"#,
        )
        .unwrap();

        assert_eq!(
            config.base_api_urls,
            vec![BaseUrlPattern::new("http://localhost/api"), BaseUrlPattern::strict("http://localhost/me")]
        );
    }

    #[test]
    fn test_from_json_not_a_document() {
        assert!(matches!(CacheConfig::from_json("not json"), Err(ConfigError::LoadFailed(_))));
        assert!(matches!(CacheConfig::from_json("42"), Err(ConfigError::LoadFailed(_))));
    }

    #[test]
    fn test_from_figment_toml() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(
            r#"
            session = "tab-1"

            [cache]
            log_enabled = true
            param = "version"
            base_api_urls = [
                "https://api.example.com/v1/orders",
                { url = "https://api.example.com/v1/me", strict = true },
            ]
            "#,
        ));

        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.session, "tab-1");
        assert!(config.db_path.is_none());
        assert!(config.cache.log_enabled);
        assert_eq!(config.cache.param, "version");
        assert_eq!(config.cache.base_api_urls.len(), 2);
        assert!(config.cache.base_api_urls[1].strict);
    }

    #[test]
    fn test_from_figment_malformed_cache_uses_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("[cache]\nparam = 7\nlog_enabled = \"yes\"\nbase_api_urls = \"http://localhost/api\""));

        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_from_figment_normalizes_cache() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("[cache]\nparam = \"\"\nbase_api_urls = [\"\"]"));

        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.cache.param, "rev");
        assert!(config.cache.base_api_urls.is_empty());
    }
}
