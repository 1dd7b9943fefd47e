//! Audit configuration
//!
//! Loaded from TOML; every key is optional:
//!
//! ```toml
//! recursive = true
//! current_version = "2.0"
//! max_chain_depth = 32
//! skip_errors = false
//! fail_on_no_effect = false
//! ```

use crate::chains::MAX_CHAIN_DEPTH;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How an audit runs and when it fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Scan submodules
    pub recursive: bool,
    /// Version to check removal deadlines against; detected when absent
    pub current_version: Option<String>,
    /// Longest deprecation chain walked
    pub max_chain_depth: usize,
    /// Never fail, only report
    pub skip_errors: bool,
    /// Treat no-effect wrappers as errors
    pub fail_on_no_effect: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            current_version: None,
            max_chain_depth: MAX_CHAIN_DEPTH,
            skip_errors: false,
            fail_on_no_effect: false,
        }
    }
}

impl AuditConfig {
    /// Parse TOML text
    ///
    /// # Errors
    /// [`ConfigError::Toml`] on malformed input or unknown keys,
    /// [`ConfigError::Invalid`] for a zero chain depth
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`AuditConfig::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading audit configuration");
        Self::from_toml_str(&text)
    }

    /// Check values a file or caller may have set
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] for a zero chain depth
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chain_depth == 0 {
            return Err(ConfigError::Invalid("max_chain_depth must be at least 1".into()));
        }
        Ok(())
    }
}
