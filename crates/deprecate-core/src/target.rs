//! Deprecation targets
//!
//! A target decides what a wrapper does with a call: nothing but warn
//! ([`Target::Absent`]), rebind arguments for the wrapped body itself
//! ([`Target::SelfReference`]) or forward to a replacement callable.
//! Replacements that do not exist yet when the wrapper is built are named
//! through a [`DeferredTarget`] slot and bound later.

use crate::callable::{Callable, Class};
use crate::error::ConfigurationError;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Bind-once slot for a forward-referenced target
#[derive(Clone)]
pub struct DeferredTarget(Arc<DeferredInner>);

struct DeferredInner {
    path: String,
    slot: OnceCell<Callable>,
}

impl DeferredTarget {
    /// Create an unbound slot for the callable at `path`
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(Arc::new(DeferredInner {
            path: path.into(),
            slot: OnceCell::new(),
        }))
    }

    /// Dotted path the slot was declared with
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.0.path
    }

    /// Bind the slot
    ///
    /// # Errors
    /// [`ConfigurationError::TargetAlreadyBound`] on a second bind
    pub fn bind(&self, callable: Callable) -> Result<(), ConfigurationError> {
        self.0
            .slot
            .set(callable)
            .map_err(|_| ConfigurationError::TargetAlreadyBound(self.0.path.clone()))
    }

    /// Bound callable
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&Callable> {
        self.0.slot.get()
    }

    /// Check if the slot was bound
    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.0.slot.get().is_some()
    }
}

impl fmt::Debug for DeferredTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredTarget")
            .field("path", &self.0.path)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// What a deprecation wrapper does with a call
#[derive(Debug, Clone, Default)]
pub enum Target {
    /// Warn only, run the wrapped body with the original arguments
    #[default]
    Absent,

    /// Run the wrapped body with remapped arguments
    SelfReference,

    /// Forward to a replacement
    Callable(Callable),

    /// Forward to a replacement bound after the wrapper was built
    Deferred(DeferredTarget),
}

impl Target {
    /// Forward to a class constructor
    #[must_use]
    pub fn class(class: &Class) -> Self {
        Self::Callable(class.constructor().clone())
    }

    /// Check for [`Target::Absent`]
    #[inline]
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Check for [`Target::SelfReference`]
    #[inline]
    #[must_use]
    pub fn is_self_reference(&self) -> bool {
        matches!(self, Self::SelfReference)
    }

    /// Check if calls go to a replacement callable
    #[inline]
    #[must_use]
    pub fn forwards(&self) -> bool {
        matches!(self, Self::Callable(_) | Self::Deferred(_))
    }

    /// Replacement callable, if known
    #[must_use]
    pub fn resolve(&self) -> Option<&Callable> {
        match self {
            Self::Callable(callable) => Some(callable),
            Self::Deferred(deferred) => deferred.get(),
            Self::Absent | Self::SelfReference => None,
        }
    }

    /// Display name of the replacement, empty without one
    #[must_use]
    pub fn name(&self) -> String {
        match (self, self.resolve()) {
            (_, Some(callable)) => callable.display_name().to_string(),
            (Self::Deferred(deferred), None) => deferred
                .path()
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        }
    }

    /// Dotted path of the replacement, empty without one
    #[must_use]
    pub fn path(&self) -> String {
        match (self, self.resolve()) {
            (_, Some(callable)) => callable.path(),
            (Self::Deferred(deferred), None) => deferred.path().to_string(),
            _ => String::new(),
        }
    }
}

impl From<Callable> for Target {
    fn from(callable: Callable) -> Self {
        Self::Callable(callable)
    }
}

impl From<&Callable> for Target {
    fn from(callable: &Callable) -> Self {
        Self::Callable(callable.clone())
    }
}

impl From<&Class> for Target {
    fn from(class: &Class) -> Self {
        Self::class(class)
    }
}

impl From<DeferredTarget> for Target {
    fn from(deferred: DeferredTarget) -> Self {
        Self::Deferred(deferred)
    }
}

impl From<&DeferredTarget> for Target {
    fn from(deferred: &DeferredTarget) -> Self {
        Self::Deferred(deferred.clone())
    }
}

impl From<Option<Callable>> for Target {
    fn from(callable: Option<Callable>) -> Self {
        callable.map_or(Self::Absent, Self::Callable)
    }
}
