//! Deprecation shim engine
//!
//! Marks callables as deprecated while forwarding calls to their
//! replacements.
//!
//! # Overview
//!
//! - **Callable / Class**: named functions with explicit signatures
//! - **deprecated**: builds forwarding wrappers with argument mapping
//! - **Throttle**: limits how often a wrapper warns
//! - **Stream / warnings**: where deprecation messages go
//! - **DeprecatedInstance**: legacy values that warn on access
//!
//! # Example
//!
//! ```rust
//! use deprecate_core::prelude::*;
//! use serde_json::json;
//!
//! let scale = Callable::builder("scale")
//!     .module("geo")
//!     .param(Parameter::required("value"))
//!     .param(Parameter::optional("factor", 2))
//!     .body(|args| Ok(json!(args.extract::<i64>("value")? * args.extract::<i64>("factor")?)));
//!
//! // `stretch(value, ratio)` became `scale(value, factor)`
//! let stretch = Callable::builder("stretch")
//!     .module("geo")
//!     .param(Parameter::required("value"))
//!     .param(Parameter::optional("ratio", 2))
//!     .declared();
//! let stretch = deprecated(&scale)
//!     .deprecated_in("1.2")
//!     .remove_in("2.0")
//!     .arg("ratio", "factor")
//!     .wrap(&stretch)
//!     .unwrap();
//!
//! let (out, warnings) = catch_warnings(|| stretch.call(&Arguments::new().arg(3).kwarg("ratio", 4)));
//! assert_eq!(out.unwrap(), json!(12));
//! assert_eq!(warnings[0].category, WarningCategory::Future);
//! ```

#![warn(missing_docs)]

pub mod arguments;
pub mod callable;
pub mod deprecation;
pub mod error;
pub mod instance;
pub mod reconcile;
pub mod signature;
pub mod stream;
pub mod target;
pub mod template;
pub mod throttle;
pub mod warnings;

// Re-exports
pub use arguments::{Arguments, BoundArguments, Kwargs};
pub use callable::{BodyFn, Callable, CallableBuilder, CallableKind, Class, ClassBuilder};
pub use deprecation::{
    deprecated, Deprecated, MetadataSummary, SkipIf, TargetSummary, WrapperMetadata,
};
pub use error::{ArgumentMappingError, BindingError, CallError, ConfigurationError, ProxyError};
pub use instance::{deprecated_instance, DeprecatedInstance, InstanceBuilder};
pub use reconcile::{ArgMap, ArgsMapping, Reconciler};
pub use signature::{ParamKind, Parameter, Signature};
pub use stream::Stream;
pub use target::{DeferredTarget, Target};
pub use throttle::{CallCounter, NumWarns, Throttle};
pub use warnings::{catch_warnings, warn, CaptureScope, WarningCategory, WarningRecord};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for declaring deprecations
    pub use crate::{
        catch_warnings, deprecated, deprecated_instance, ArgMap, Arguments, BoundArguments,
        CallError, Callable, Class, ConfigurationError, DeferredTarget, Deprecated, Parameter,
        Signature, SkipIf, Stream, Target, WarningCategory,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
