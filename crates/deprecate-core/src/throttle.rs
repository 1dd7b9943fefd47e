//! Warning throttle
//!
//! Decides per call whether a wrapper warns. Whole-callable deprecations use
//! one counter per wrapper; argument deprecations use one counter per mapped
//! argument, so two renamed arguments warn independently.
//!
//! Counters are lock-free and linearizable: a concurrent caller always
//! observes a counter value that existed at some point of the interleaving.

use crate::error::ConfigurationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How many times a counter lets a warning through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum NumWarns {
    /// Warn on every call (`-1`)
    Unlimited,

    /// Never warn (`0`)
    Never,

    /// Warn on the first `n` eligible calls
    Cap(NonZeroUsize),
}

impl NumWarns {
    /// Interpret the signed count used by the decorator contract
    ///
    /// # Errors
    /// [`ConfigurationError::InvalidNumWarns`] for values below `-1`
    pub fn from_count(count: i64) -> Result<Self, ConfigurationError> {
        match count {
            -1 => Ok(Self::Unlimited),
            0 => Ok(Self::Never),
            n if n > 0 => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(Self::Cap)
                .ok_or(ConfigurationError::InvalidNumWarns(count)),
            _ => Err(ConfigurationError::InvalidNumWarns(count)),
        }
    }

    /// Signed count representation
    #[must_use]
    pub fn as_count(self) -> i64 {
        match self {
            Self::Unlimited => -1,
            Self::Never => 0,
            Self::Cap(n) => i64::try_from(n.get()).unwrap_or(i64::MAX),
        }
    }
}

impl Default for NumWarns {
    fn default() -> Self {
        Self::Cap(NonZeroUsize::MIN)
    }
}

impl TryFrom<i64> for NumWarns {
    type Error = ConfigurationError;

    fn try_from(count: i64) -> Result<Self, Self::Error> {
        Self::from_count(count)
    }
}

impl From<NumWarns> for i64 {
    fn from(value: NumWarns) -> Self {
        value.as_count()
    }
}

/// Monotonic per-wrapper counter
#[derive(Debug, Default)]
pub struct CallCounter(AtomicUsize);

impl CallCounter {
    /// Counter starting at zero
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    /// Current value
    #[inline]
    #[must_use]
    pub fn value(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    /// Read-and-increment if `limit` still allows a warning
    ///
    /// Returns `true` when the caller should warn.
    pub fn try_acquire(&self, limit: NumWarns) -> bool {
        match limit {
            NumWarns::Never => false,
            NumWarns::Unlimited => {
                self.0.fetch_add(1, Ordering::AcqRel);
                true
            }
            NumWarns::Cap(cap) => self
                .0
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |seen| {
                    (seen < cap.get()).then_some(seen + 1)
                })
                .is_ok(),
        }
    }
}

/// Counter tree of one wrapper
#[derive(Debug)]
pub struct Throttle {
    limit: NumWarns,
    callable: CallCounter,
    arguments: IndexMap<String, CallCounter>,
}

impl Throttle {
    /// Create throttle with one sub-counter per mapped argument
    #[must_use]
    pub fn new<I, S>(limit: NumWarns, mapped_arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            limit,
            callable: CallCounter::new(),
            arguments: mapped_arguments
                .into_iter()
                .map(|name| (name.into(), CallCounter::new()))
                .collect(),
        }
    }

    /// Configured limit
    #[inline]
    #[must_use]
    pub fn limit(&self) -> NumWarns {
        self.limit
    }

    /// Decide for a whole-callable deprecation
    pub fn acquire_callable(&self) -> bool {
        let due = self.callable.try_acquire(self.limit);
        tracing::trace!(due, warned = self.callable.value(), "callable throttle");
        due
    }

    /// Decide for an argument deprecation
    ///
    /// Every used argument's counter is consulted; the call warns if any of
    /// them still has budget left.
    pub fn acquire_arguments<'a, I>(&self, used: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut due = false;
        for name in used {
            if let Some(counter) = self.arguments.get(name) {
                due |= counter.try_acquire(self.limit);
            }
        }
        tracing::trace!(due, "argument throttle");
        due
    }

    /// Warnings emitted for the whole callable
    #[inline]
    #[must_use]
    pub fn warned(&self) -> usize {
        self.callable.value()
    }

    /// Warnings emitted for a mapped argument
    #[must_use]
    pub fn warned_argument(&self, name: &str) -> Option<usize> {
        self.arguments.get(name).map(CallCounter::value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn num_warns_from_count() {
        assert_eq!(NumWarns::from_count(-1).unwrap(), NumWarns::Unlimited);
        assert_eq!(NumWarns::from_count(0).unwrap(), NumWarns::Never);
        assert_eq!(NumWarns::from_count(3).unwrap().as_count(), 3);
        assert_eq!(
            NumWarns::from_count(-2),
            Err(ConfigurationError::InvalidNumWarns(-2))
        );
    }

    #[test]
    fn default_warns_once() {
        assert_eq!(NumWarns::default().as_count(), 1);
    }

    #[test]
    fn never_does_not_count() {
        let counter = CallCounter::new();
        assert!(!counter.try_acquire(NumWarns::Never));
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn arguments_warn_independently() {
        let throttle = Throttle::new(NumWarns::default(), ["a", "b"]);

        assert!(throttle.acquire_arguments(["a"]));
        assert!(!throttle.acquire_arguments(["a"]));
        assert!(throttle.acquire_arguments(["b"]));
        assert!(!throttle.acquire_arguments(["a", "b"]));
        assert_eq!(throttle.warned_argument("a"), Some(1));
        assert_eq!(throttle.warned_argument("zzz"), None);
    }

    #[test]
    fn concurrent_acquire_never_exceeds_cap() {
        let throttle = std::sync::Arc::new(Throttle::new(
            NumWarns::from_count(5).unwrap(),
            Vec::<String>::new(),
        ));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let throttle = std::sync::Arc::clone(&throttle);
                std::thread::spawn(move || {
                    (0..100).filter(|_| throttle.acquire_callable()).count()
                })
            })
            .collect();
        let emitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(emitted, 5);
    }

    proptest! {
        #[test]
        fn prop_cap_emits_exactly_n(n in 1i64..20, extra in 0usize..20) {
            let limit = NumWarns::from_count(n).unwrap();
            let counter = CallCounter::new();
            let total = usize::try_from(n).unwrap() + extra;
            let emitted = (0..total).filter(|_| counter.try_acquire(limit)).count();
            prop_assert_eq!(emitted, usize::try_from(n).unwrap());
        }

        #[test]
        fn prop_unlimited_always_emits(calls in 0usize..50) {
            let counter = CallCounter::new();
            let emitted = (0..calls).filter(|_| counter.try_acquire(NumWarns::Unlimited)).count();
            prop_assert_eq!(emitted, calls);
        }
    }
}
