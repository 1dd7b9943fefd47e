//! Error types for the audit subsystem
//!
//! Audits report findings as values. Errors are reserved for conditions
//! that make a whole audit meaningless:
//! - [`AuditError`]: bad input to an audit entry point
//! - [`ImportError`]: a module that cannot be loaded
//! - [`ManifestError`]: a manifest that cannot be read or resolved
//! - [`ConfigError`]: an audit configuration file that cannot be loaded

use deprecate_core::ConfigurationError;
use std::path::PathBuf;

/// Failure of an audit entry point
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    /// Callable carries no deprecation metadata
    #[error("`{0}` is not decorated with a deprecation wrapper")]
    NotDeprecated(String),

    /// The current version does not parse
    #[error("invalid current version `{version}`: {reason}")]
    InvalidVersion { version: String, reason: String },

    /// No version is known for the package of a module
    #[error("could not determine version for package `{0}`; pass the current version explicitly")]
    VersionUnavailable(String),

    /// Module path could not be loaded
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Forwarding targets form a cycle
    #[error("deprecation chain of `{start}` loops back through: {}", .path.join(" -> "))]
    ChainCycle { start: String, path: Vec<String> },

    /// Forwarding targets go deeper than the configured bound
    #[error("deprecation chain of `{start}` exceeds {max_depth} hops")]
    ChainTooDeep { start: String, max_depth: usize },
}

/// Module that cannot be loaded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    /// Nothing registered under the path
    #[error("no module named `{0}`")]
    NotFound(String),

    /// The module's loader failed
    #[error("failed to load module `{module}`: {reason}")]
    LoadFailed { module: String, reason: String },
}

impl ImportError {
    /// Create load failure
    pub fn load_failed(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// Module the error is about
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::NotFound(module) | Self::LoadFailed { module, .. } => module,
        }
    }
}

/// Manifest that cannot be read or resolved
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// IO error while reading the manifest
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON
    #[error("invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML
    #[error("invalid TOML manifest: {0}")]
    Toml(#[from] toml::de::Error),

    /// Unsupported file extension
    #[error("unsupported manifest format `{0}`, expected .json or .toml")]
    UnsupportedFormat(String),

    /// Target specification that names nothing declared
    #[error("target `{target}` of `{function}` is not declared in the manifest")]
    UnknownTarget { function: String, target: String },

    /// Two declarations for one name
    #[error("`{0}` is declared twice")]
    Duplicate(String),

    /// Deprecation configuration rejected by the wrapper builder
    #[error("invalid deprecation of `{function}`: {source}")]
    Configuration {
        function: String,
        #[source]
        source: ConfigurationError,
    },
}

impl ManifestError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Audit configuration that cannot be loaded
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error while reading the file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML or unknown keys
    #[error("invalid audit configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Values that make no sense together
    #[error("invalid audit configuration: {0}")]
    Invalid(String),
}
