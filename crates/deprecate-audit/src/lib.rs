//! Audit of deprecation wrappers
//!
//! Development and CI checks over namespaces of deprecated callables:
//!
//! - **Wrapper configuration**: mappings naming no parameter, identity and
//!   empty mappings, targets pointing back at the wrapper
//! - **Expiry**: wrappers still present at or after their removal version
//! - **Chains**: wrappers whose target is itself deprecated, or stacked
//!   argument deprecations
//!
//! Namespaces are [`Module`]s built in code or loaded from a [`Manifest`]
//! into a [`ModuleRegistry`].
//!
//! # Example
//!
//! ```rust
//! use deprecate_audit::{find_deprecated_callables, Module};
//! use deprecate_core::prelude::*;
//!
//! let source = Callable::builder("old")
//!     .module("pkg")
//!     .param(Parameter::optional("a", 1))
//!     .declared();
//! let old = deprecated(Target::SelfReference)
//!     .arg("a", "a")
//!     .wrap(&source)
//!     .unwrap();
//! let pkg = Module::builder("pkg").function(old).build();
//!
//! let found = find_deprecated_callables(&pkg, true);
//! assert!(found[0].no_effect);
//! assert_eq!(found[0].identity_mapping, ["a"]);
//! ```

#![warn(missing_docs)]

pub mod chains;
pub mod config;
pub mod error;
pub mod expiry;
pub mod manifest;
pub mod namespace;
pub mod registry;
pub mod report;
pub mod scanner;
pub mod validate;
pub mod version;

// Re-exports
pub use chains::{chain_hops, validate_deprecation_chains, MAX_CHAIN_DEPTH};
pub use config::AuditConfig;
pub use error::{AuditError, ConfigError, ImportError, ManifestError};
pub use expiry::validate_deprecation_expiry;
pub use manifest::Manifest;
pub use namespace::{LazyModule, Member, Module, ModuleBuilder, ModuleRef, Namespace};
pub use registry::ModuleRegistry;
pub use report::AuditReport;
pub use scanner::find_deprecated_callables;
pub use validate::{validate_deprecated_callable, ChainType, DeprecatedCallableInfo};
pub use version::{is_expired, parse_version};
