//! Configuration loading, validation, and defaults for localbrain.
//!
//! All tunables of the context core live here as named, typed fields with
//! documented defaults. Configuration is constructed explicitly and passed
//! into the assembler/cache constructors — never looked up ad hoc from
//! process-global state. Loadable from a TOML file with environment variable
//! overrides for the numeric limits.

use localbrain_core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Context assembler tunables.
    #[serde(default)]
    pub assembler: AssemblerConfig,

    /// Response cache tunables.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Named persona configurations, keyed by archetype name.
    #[serde(default)]
    pub archetypes: HashMap<String, ArchetypeConfig>,
}

/// Tunables for the context assembler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Number of recent *exchanges* (user + assistant pairs) always included.
    /// The recency window holds up to twice this many turns.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Maximum semantic matches pulled from the current conversation.
    #[serde(default = "default_current_scope_limit")]
    pub current_scope_limit: usize,

    /// Maximum semantic matches pulled from the user's other conversations.
    #[serde(default = "default_global_scope_limit")]
    pub global_scope_limit: usize,

    /// Estimated-token budget for the assembled bundle. Distinct from the
    /// caller's own prompt/response budget.
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,

    /// Deadline for a single embedding oracle call, in milliseconds.
    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,

    /// Deadline for a single turn store call, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_recent_limit() -> usize {
    3
}
fn default_current_scope_limit() -> usize {
    3
}
fn default_global_scope_limit() -> usize {
    2
}
fn default_token_budget() -> usize {
    5000
}
fn default_oracle_timeout_ms() -> u64 {
    10_000
}
fn default_store_timeout_ms() -> u64 {
    10_000
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            current_scope_limit: default_current_scope_limit(),
            global_scope_limit: default_global_scope_limit(),
            token_budget: default_token_budget(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl AssemblerConfig {
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_budget == 0 {
            return Err(ConfigError::Invalid("token_budget must be > 0".into()));
        }
        if self.recent_limit == 0 {
            return Err(ConfigError::Invalid("recent_limit must be > 0".into()));
        }
        if self.oracle_timeout_ms == 0 || self.store_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be > 0".into()));
        }
        Ok(())
    }
}

/// Tunables for the response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of live entries. Inserting past this evicts the
    /// least-recently-accessed entry.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Default time-to-live applied when `store` is called without an
    /// explicit TTL, in seconds. `None` means entries never expire.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: Option<u64>,
}

fn default_max_entries() -> usize {
    1000
}
fn default_ttl_secs() -> Option<u64> {
    Some(3600)
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            default_ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(ConfigError::Invalid("max_entries must be > 0".into()));
        }
        Ok(())
    }
}

/// A persona ("archetype") configuration.
///
/// The core never interprets these fields; they exist so the caller's model
/// calls and cache fingerprints share one typed source instead of a
/// loosely-typed blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeConfig {
    /// Archetype name, also used in cache fingerprints.
    pub name: String,

    /// Model identifier passed to the provider.
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff, if the provider supports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Maximum tokens per model response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// System prompt prepended by the caller.
    #[serde(default)]
    pub system_prompt: String,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment variable
    /// overrides (`LOCALBRAIN_TOKEN_BUDGET`, `LOCALBRAIN_CACHE_MAX_ENTRIES`,
    /// `LOCALBRAIN_CACHE_TTL_SECS`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        let mut config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.apply_env_overrides();
        config.validate()?;
        tracing::debug!(
            budget = config.assembler.token_budget,
            max_entries = config.cache.max_entries,
            "configuration loaded"
        );
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_usize("LOCALBRAIN_TOKEN_BUDGET") {
            self.assembler.token_budget = v;
        }
        if let Some(v) = env_usize("LOCALBRAIN_CACHE_MAX_ENTRIES") {
            self.cache.max_entries = v;
        }
        if let Ok(v) = std::env::var("LOCALBRAIN_CACHE_TTL_SECS") {
            self.cache.default_ttl_secs = v.parse().ok();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.assembler.validate()?;
        self.cache.validate()?;
        for (key, archetype) in &self.archetypes {
            if archetype.model.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "archetype '{key}' has no model"
                )));
            }
        }
        Ok(())
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.assembler.recent_limit, 3);
        assert_eq!(config.assembler.current_scope_limit, 3);
        assert_eq!(config.assembler.global_scope_limit, 2);
        assert_eq!(config.assembler.token_budget, 5000);
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.cache.default_ttl_secs, Some(3600));
    }

    #[test]
    fn validate_rejects_zero_budget() {
        let mut config = AppConfig::default();
        config.assembler.token_budget = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let config = CacheConfig {
            max_entries: 0,
            default_ttl_secs: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[assembler]
recent_limit = 5
token_budget = 8000

[cache]
max_entries = 50

[archetypes.analyst]
name = "analyst"
model = "gemini-1.5-pro"
system_prompt = "You are a careful analyst."
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.assembler.recent_limit, 5);
        assert_eq!(config.assembler.token_budget, 8000);
        // unspecified fields keep their defaults
        assert_eq!(config.assembler.current_scope_limit, 3);
        assert_eq!(config.cache.max_entries, 50);

        let analyst = &config.archetypes["analyst"];
        assert_eq!(analyst.model, "gemini-1.5-pro");
        assert!((analyst.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(analyst.max_tokens, 4096);
    }

    #[test]
    fn load_rejects_missing_file() {
        let err = AppConfig::load("/nonexistent/localbrain.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn archetype_without_model_is_invalid() {
        let mut config = AppConfig::default();
        config.archetypes.insert(
            "broken".into(),
            ArchetypeConfig {
                name: "broken".into(),
                model: String::new(),
                temperature: 0.7,
                top_p: None,
                max_tokens: 1024,
                system_prompt: String::new(),
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn timeout_accessors_convert_to_duration() {
        let config = AssemblerConfig::default();
        assert_eq!(config.oracle_timeout(), Duration::from_secs(10));
        assert_eq!(config.store_timeout(), Duration::from_secs(10));
    }
}
