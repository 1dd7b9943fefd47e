//! Warning mechanism with thread-local capture scopes
//!
//! [`warn`] is the default sink of every deprecation wrapper. Outside of a
//! capture scope a warning becomes a `tracing` event at `WARN` level with the
//! category attached as a field. Inside a scope opened by [`CaptureScope`] or
//! [`catch_warnings`] the warning is recorded instead, on the emitting thread
//! only, by every scope open on it.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;

/// Warning category
///
/// Every category is a sub-category of [`WarningCategory::Warning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    /// Base category
    Warning,

    /// Generic user-facing warning
    User,

    /// Deprecation aimed at developers
    Deprecation,

    /// Deprecation announced for a future release
    PendingDeprecation,

    /// Deprecation aimed at end users of a library
    Future,
}

impl WarningCategory {
    /// Check if this category is selected by `filter`
    #[inline]
    #[must_use]
    pub fn matches(self, filter: Self) -> bool {
        filter == Self::Warning || self == filter
    }

    /// Display name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::User => "UserWarning",
            Self::Deprecation => "DeprecationWarning",
            Self::PendingDeprecation => "PendingDeprecationWarning",
            Self::Future => "FutureWarning",
        }
    }
}

impl Display for WarningCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A captured warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRecord {
    /// Rendered message
    pub message: String,
    /// Category it was emitted with
    pub category: WarningCategory,
}

impl Display for WarningRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

thread_local! {
    static SCOPES: RefCell<Vec<Vec<WarningRecord>>> = const { RefCell::new(Vec::new()) };
}

/// Emit a warning
///
/// Recorded by every capture scope open on the current thread, or
/// forwarded to `tracing` when no scope is open.
pub fn warn(message: &str, category: WarningCategory) {
    let captured = SCOPES.with(|scopes| {
        let mut scopes = scopes.borrow_mut();
        for scope in scopes.iter_mut() {
            scope.push(WarningRecord {
                message: message.to_string(),
                category,
            });
        }
        !scopes.is_empty()
    });

    if !captured {
        tracing::warn!(category = %category, "{message}");
    }
}

/// RAII capture scope
///
/// Closing the scope (drop) restores the previous one on every exit path,
/// unwinding included. Not `Send`: a scope belongs to the thread that
/// opened it.
#[derive(Debug)]
pub struct CaptureScope {
    depth: usize,
    _thread_bound: PhantomData<*const ()>,
}

impl CaptureScope {
    /// Open a new innermost scope on the current thread
    #[must_use]
    pub fn enter() -> Self {
        let depth = SCOPES.with(|scopes| {
            let mut scopes = scopes.borrow_mut();
            scopes.push(Vec::new());
            scopes.len()
        });
        Self {
            depth,
            _thread_bound: PhantomData,
        }
    }

    /// Close the scope and return its warnings
    #[must_use]
    pub fn finish(self) -> Vec<WarningRecord> {
        SCOPES.with(|scopes| {
            scopes
                .borrow_mut()
                .get_mut(self.depth - 1)
                .map(std::mem::take)
                .unwrap_or_default()
        })
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        SCOPES.with(|scopes| scopes.borrow_mut().truncate(self.depth - 1));
    }
}

/// Run `f` while recording every warning it emits on this thread
pub fn catch_warnings<R>(f: impl FnOnce() -> R) -> (R, Vec<WarningRecord>) {
    let scope = CaptureScope::enter();
    let result = f();
    (result, scope.finish())
}
