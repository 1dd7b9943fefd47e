//! Warning output streams
//!
//! The stream is the injected sink a wrapper sends rendered messages to. It is
//! external code from the wrapper's point of view and is always invoked
//! without holding any lock.

use crate::warnings::{self, WarningCategory};
use std::fmt;
use std::sync::Arc;
use tracing::Level;

/// Callback sink signature
pub type StreamFn = dyn Fn(&str, WarningCategory) + Send + Sync;

/// Where deprecation messages go
#[derive(Clone)]
pub enum Stream {
    /// The [`warnings`] mechanism with the given category
    Warn(WarningCategory),

    /// A `tracing` event at the given level
    Log(Level),

    /// Arbitrary callback
    Callback(Arc<StreamFn>),

    /// Drop every message
    Disabled,
}

impl Stream {
    /// Stream into an arbitrary callback
    #[must_use]
    pub fn callback(f: impl Fn(&str, WarningCategory) + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(f))
    }

    /// Check if messages reach anything
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Category attached to emitted messages
    #[inline]
    #[must_use]
    pub fn category(&self) -> WarningCategory {
        match self {
            Self::Warn(category) => *category,
            _ => WarningCategory::Future,
        }
    }

    /// Send a rendered message
    pub fn emit(&self, message: &str) {
        match self {
            Self::Warn(category) => warnings::warn(message, *category),
            Self::Log(level) => match *level {
                Level::ERROR => tracing::error!(target: "deprecate", "{message}"),
                Level::WARN => tracing::warn!(target: "deprecate", "{message}"),
                Level::INFO => tracing::info!(target: "deprecate", "{message}"),
                Level::DEBUG => tracing::debug!(target: "deprecate", "{message}"),
                _ => tracing::trace!(target: "deprecate", "{message}"),
            },
            Self::Callback(f) => f(message, WarningCategory::Future),
            Self::Disabled => {}
        }
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::Warn(WarningCategory::Future)
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn(category) => f.debug_tuple("Warn").field(category).finish(),
            Self::Log(level) => f.debug_tuple("Log").field(level).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Disabled => f.write_str("Disabled"),
        }
    }
}
