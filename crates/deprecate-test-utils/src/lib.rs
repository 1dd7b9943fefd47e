//! Testing utilities for the deprecate workspace
//!
//! Warning assertions, a recording stream, and shared fixture modules.

#![allow(missing_docs)]

pub mod fixtures;

use deprecate_core::{CaptureScope, Stream, WarningCategory, WarningRecord};
use parking_lot::Mutex;
use std::sync::Arc;

/// Run `f` and panic if it emitted a matching warning
///
/// Without `category` every warning matches; with `pattern` only warnings
/// whose message contains it.
pub fn no_warning_call<R>(category: Option<WarningCategory>, pattern: Option<&str>, f: impl FnOnce() -> R) -> R {
    let guard = NoWarningGuard::new(category, pattern);
    let result = f();
    guard.check();
    result
}

/// Scope asserting on drop that no matching warning was emitted
pub struct NoWarningGuard {
    scope: Option<CaptureScope>,
    category: Option<WarningCategory>,
    pattern: Option<String>,
}

impl NoWarningGuard {
    pub fn new(category: Option<WarningCategory>, pattern: Option<&str>) -> Self {
        Self {
            scope: Some(CaptureScope::enter()),
            category,
            pattern: pattern.map(str::to_string),
        }
    }

    /// Close the scope now and assert
    pub fn check(mut self) {
        self.assert_clean();
    }

    fn assert_clean(&mut self) {
        let Some(scope) = self.scope.take() else {
            return;
        };
        let found: Vec<WarningRecord> = scope
            .finish()
            .into_iter()
            .filter(|record| self.category.map_or(true, |filter| record.category.matches(filter)))
            .filter(|record| self.pattern.as_deref().map_or(true, |p| record.message.contains(p)))
            .collect();
        if found.is_empty() {
            return;
        }
        let listed: Vec<String> = found.iter().map(ToString::to_string).collect();
        match (&self.category, &self.pattern) {
            (None, _) => panic!("While catching all warnings, these were found: {listed:?}"),
            (Some(category), None) => {
                panic!("While catching `{category}` warnings, these were found: {listed:?}")
            }
            (Some(category), Some(pattern)) => panic!(
                "While catching `{category}` warnings with \"{pattern}\", these were found: {listed:?}"
            ),
        }
    }
}

impl Drop for NoWarningGuard {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            self.assert_clean();
        }
    }
}

/// Stream that keeps every message it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingStream {
    records: Arc<Mutex<Vec<WarningRecord>>>,
}

impl RecordingStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream feeding this recorder
    pub fn stream(&self) -> Stream {
        let records = Arc::clone(&self.records);
        Stream::callback(move |message, category| {
            records.lock().push(WarningRecord {
                message: message.to_string(),
                category,
            });
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}
