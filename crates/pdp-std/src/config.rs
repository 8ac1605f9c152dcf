//! PDP configuration
//!
//! Loaded from TOML. Every field is optional:
//!
//! ```toml
//! xpath_version = "http://www.w3.org/TR/1999/REC-xpath-19991116"
//! trace = false
//! return_policy_id_list = false
//! ```

use crate::error::{ConfigError, Result};
use pdp_core::{Identifier, PolicyDefaults, DEFAULT_XPATH_VERSION};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Process-wide evaluation settings
///
/// Deserialization goes through a raw struct and `TryFrom`, so a config
/// that parses is always a valid one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PdpConfigRaw")]
pub struct PdpConfig {
    /// Root XPath version of every `PolicyDefaults` chain
    xpath_version: String,

    /// Whether contexts report trace events
    trace: bool,

    /// Default for requests that do not say whether they want policy identifiers
    return_policy_id_list: bool,
}

fn default_xpath_version() -> String {
    DEFAULT_XPATH_VERSION.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct PdpConfigRaw {
    #[serde(default = "default_xpath_version")]
    xpath_version: String,
    #[serde(default)]
    trace: bool,
    #[serde(default)]
    return_policy_id_list: bool,
}

impl TryFrom<PdpConfigRaw> for PdpConfig {
    type Error = ConfigError;

    fn try_from(raw: PdpConfigRaw) -> Result<Self> {
        let xpath_version = raw.xpath_version.trim();
        if xpath_version.is_empty() {
            return Err(ConfigError::Invalid {
                field: "xpath_version",
                reason: "must not be empty".to_string(),
            });
        }
        if xpath_version.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "xpath_version",
                reason: format!("\"{xpath_version}\" is not a URI"),
            });
        }

        Ok(Self {
            xpath_version: xpath_version.to_string(),
            trace: raw.trace,
            return_policy_id_list: raw.return_policy_id_list,
        })
    }
}

impl Default for PdpConfig {
    fn default() -> Self {
        Self {
            xpath_version: default_xpath_version(),
            trace: false,
            return_policy_id_list: false,
        }
    }
}

impl PdpConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn context tracing on or off
    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Set the default for `return_policy_id_list`
    #[must_use]
    pub fn with_return_policy_id_list(mut self, value: bool) -> Self {
        self.return_policy_id_list = value;
        self
    }

    /// Root XPath version
    #[must_use]
    pub fn xpath_version(&self) -> &str {
        &self.xpath_version
    }

    /// Whether tracing is on
    #[must_use]
    pub const fn trace(&self) -> bool {
        self.trace
    }

    /// Default for requests that leave `return_policy_id_list` unspecified
    #[must_use]
    pub const fn return_policy_id_list(&self) -> bool {
        self.return_policy_id_list
    }

    /// The outermost defaults scope, parent of every policy's own defaults
    #[must_use]
    pub fn root_defaults(&self) -> Arc<PolicyDefaults> {
        Arc::new(PolicyDefaults::new(
            Some(Identifier::new(&self.xpath_version)),
            None,
        ))
    }

    /// Parse and validate a TOML configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Toml` for malformed input and
    /// `ConfigError::Invalid` for unusable values
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        Ok(config)
    }

    /// Serialize to TOML
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialization` if encoding fails
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ConfigError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = PdpConfig::from_toml("").unwrap();
        assert_eq!(config, PdpConfig::default());
        assert_eq!(config.xpath_version(), DEFAULT_XPATH_VERSION);
        assert!(!config.trace());
    }

    #[test]
    fn test_full_toml() {
        let config = PdpConfig::from_toml(
            r#"
            xpath_version = "http://www.w3.org/TR/2007/REC-xpath20-20070123"
            trace = true
            return_policy_id_list = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config.xpath_version(),
            "http://www.w3.org/TR/2007/REC-xpath20-20070123"
        );
        assert!(config.trace());
        assert!(config.return_policy_id_list());
    }

    #[test]
    fn test_empty_xpath_version_rejected() {
        let err = PdpConfig::from_toml(r#"xpath_version = "  ""#).unwrap_err();
        assert!(err.to_string().contains("xpath_version"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            PdpConfig::from_toml("tracing = true"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        let config = PdpConfig::new().with_trace(true);
        let text = config.to_toml().unwrap();
        assert_eq!(PdpConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_root_defaults() {
        let config = PdpConfig::from_toml(r#"xpath_version = "urn:test:xpath""#).unwrap();
        assert_eq!(config.root_defaults().xpath_version(), "urn:test:xpath");
    }
}
