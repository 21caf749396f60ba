//! Output runtime configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Preference key holding the active theme id.
pub const DEFAULT_THEME_PREF_KEY: &str = "output.theme.v1";
/// Preference key holding the cached custom theme list.
pub const DEFAULT_CUSTOM_THEME_CACHE_KEY: &str = "output.custom_themes.v1";
/// Preference key holding the persisted command history.
pub const DEFAULT_HISTORY_PREF_KEY: &str = "output.history.v1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Configuration load failures.
pub enum ConfigError {
    /// The TOML document does not parse.
    #[error("failed to parse output config: {0}")]
    Parse(String),
    /// A field holds an unusable value.
    #[error("invalid output config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Tunables for dispatch, theming, and history.
pub struct OutputConfig {
    /// Preference key for the active theme id.
    pub theme_pref_key: String,
    /// Preference key for the local custom theme cache.
    pub custom_theme_cache_key: String,
    /// Theme ids with this prefix are derived from seed colors.
    pub custom_theme_prefix: String,
    /// Nesting depth the generic key/value listing expands before summarizing.
    pub generic_listing_depth: usize,
    /// Maximum rows a list renderer shows before truncating.
    pub max_list_rows: usize,
    /// History entries kept in memory and in local preferences.
    pub history_capacity: usize,
    /// Preference key for the persisted history.
    pub history_pref_key: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            theme_pref_key: DEFAULT_THEME_PREF_KEY.to_string(),
            custom_theme_cache_key: DEFAULT_CUSTOM_THEME_CACHE_KEY.to_string(),
            custom_theme_prefix: "custom-".to_string(),
            generic_listing_depth: 3,
            max_list_rows: 100,
            history_capacity: 200,
            history_pref_key: DEFAULT_HISTORY_PREF_KEY.to_string(),
        }
    }
}

impl OutputConfig {
    /// Parses and validates a TOML document. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document does not parse or a field is unusable.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.theme_pref_key.trim().is_empty() {
            return Err(ConfigError::Invalid("theme_pref_key is empty".to_string()));
        }
        if self.custom_theme_cache_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "custom_theme_cache_key is empty".to_string(),
            ));
        }
        if self.history_pref_key.trim().is_empty() {
            return Err(ConfigError::Invalid("history_pref_key is empty".to_string()));
        }
        if self.custom_theme_prefix.is_empty() {
            return Err(ConfigError::Invalid("custom_theme_prefix is empty".to_string()));
        }
        if self.generic_listing_depth == 0 {
            return Err(ConfigError::Invalid(
                "generic_listing_depth must be at least 1".to_string(),
            ));
        }
        if self.max_list_rows == 0 || self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "max_list_rows and history_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `theme_id` names a seed-derived custom theme.
    pub fn is_custom_theme(&self, theme_id: &str) -> bool {
        theme_id.starts_with(&self.custom_theme_prefix)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let config = OutputConfig::from_toml_str("history_capacity = 50\n").expect("config");
        assert_eq!(
            config,
            OutputConfig {
                history_capacity: 50,
                ..OutputConfig::default()
            }
        );
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(OutputConfig::from_toml_str(""), Ok(OutputConfig::default()));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            OutputConfig::from_toml_str("generic_listing_depth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert_eq!(
            OutputConfig::from_toml_str("history_pref_key = \" \""),
            Err(ConfigError::Invalid("history_pref_key is empty".to_string()))
        );
        assert!(matches!(
            OutputConfig::from_toml_str("history_capacity = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn custom_prefix_detection() {
        let config = OutputConfig::default();
        assert!(config.is_custom_theme("custom-ocean"));
        assert!(!config.is_custom_theme("dracula"));
    }
}
