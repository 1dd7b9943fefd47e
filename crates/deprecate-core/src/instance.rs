//! Deprecated value proxy
//!
//! [`DeprecatedInstance`] wraps a legacy value (a configuration map, a
//! lookup table, a constant) and warns whenever it is accessed. Access can
//! be redirected to a replacement value and mutation can be refused.

use crate::error::{ConfigurationError, ProxyError};
use crate::stream::Stream;
use crate::template::{self, MessageContext};
use crate::throttle::{CallCounter, NumWarns};
use std::fmt;
use std::ops::Deref;

/// Start configuring a deprecated value
#[must_use]
pub fn deprecated_instance<T>(name: impl Into<String>, source: T) -> InstanceBuilder<T> {
    InstanceBuilder {
        name: name.into(),
        source,
        target: None,
        deprecated_in: None,
        remove_in: None,
        read_only: false,
        stream: Stream::default(),
        num_warns: 1,
    }
}

/// Configuration of a [`DeprecatedInstance`]
#[derive(Debug)]
pub struct InstanceBuilder<T> {
    name: String,
    source: T,
    target: Option<(String, T)>,
    deprecated_in: Option<String>,
    remove_in: Option<String>,
    read_only: bool,
    stream: Stream,
    num_warns: i64,
}

impl<T> InstanceBuilder<T> {
    /// Redirect access to a replacement value known as `name`
    #[must_use]
    pub fn target(mut self, name: impl Into<String>, value: T) -> Self {
        self.target = Some((name.into(), value));
        self
    }

    /// Version the deprecation started in
    #[must_use]
    pub fn deprecated_in(mut self, version: impl Into<String>) -> Self {
        self.deprecated_in = Some(version.into());
        self
    }

    /// Version the value goes away in
    #[must_use]
    pub fn remove_in(mut self, version: impl Into<String>) -> Self {
        self.remove_in = Some(version.into());
        self
    }

    /// Refuse mutable access
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Where messages go
    #[must_use]
    pub fn stream(mut self, stream: Stream) -> Self {
        self.stream = stream;
        self
    }

    /// Warning budget, as for wrappers
    #[must_use]
    pub fn num_warns(mut self, count: i64) -> Self {
        self.num_warns = count;
        self
    }

    /// Finish
    ///
    /// # Errors
    /// [`ConfigurationError::InvalidNumWarns`] for a budget below `-1`
    pub fn build(self) -> Result<DeprecatedInstance<T>, ConfigurationError> {
        let limit = NumWarns::from_count(self.num_warns)?;
        Ok(DeprecatedInstance {
            name: self.name,
            source: self.source,
            target: self.target,
            deprecated_in: self.deprecated_in,
            remove_in: self.remove_in,
            read_only: self.read_only,
            stream: self.stream,
            limit,
            counter: CallCounter::new(),
        })
    }
}

/// Legacy value that warns on access
pub struct DeprecatedInstance<T> {
    name: String,
    source: T,
    target: Option<(String, T)>,
    deprecated_in: Option<String>,
    remove_in: Option<String>,
    read_only: bool,
    stream: Stream,
    limit: NumWarns,
    counter: CallCounter,
}

impl<T> DeprecatedInstance<T> {
    /// Name the value is deprecated under
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if mutation is refused
    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Warnings emitted so far
    #[inline]
    #[must_use]
    pub fn warned(&self) -> usize {
        self.counter.value()
    }

    /// Shared access, warning if due
    pub fn get(&self) -> &T {
        self.warn();
        self.active()
    }

    /// Mutable access, warning if due
    ///
    /// # Errors
    /// [`ProxyError::ReadOnly`] for read-only values
    pub fn get_mut(&mut self) -> Result<&mut T, ProxyError> {
        if self.read_only {
            return Err(ProxyError::ReadOnly {
                name: self.name.clone(),
            });
        }
        self.warn();
        Ok(match &mut self.target {
            Some((_, value)) => value,
            None => &mut self.source,
        })
    }

    /// Release the wrapped values without warning
    #[must_use]
    pub fn into_inner(self) -> (T, Option<T>) {
        (self.source, self.target.map(|(_, value)| value))
    }

    fn active(&self) -> &T {
        self.target.as_ref().map_or(&self.source, |(_, value)| value)
    }

    fn warn(&self) {
        if !self.stream.is_enabled() || !self.counter.try_acquire(self.limit) {
            return;
        }
        let (template, target_name) = match &self.target {
            Some((name, _)) => (template::TEMPLATE_WARNING_CALLABLE, name.as_str()),
            None => (template::TEMPLATE_WARNING_NO_TARGET, ""),
        };
        let ctx = MessageContext {
            source_name: &self.name,
            source_path: &self.name,
            target_name,
            target_path: target_name,
            deprecated_in: self.deprecated_in.as_deref().unwrap_or_default(),
            remove_in: self.remove_in.as_deref().unwrap_or_default(),
            argument_map: "",
        };
        match template::render(template, &ctx) {
            Ok(message) => self.stream.emit(&message),
            Err(err) => tracing::error!(name = %self.name, error = %err, "failed to render deprecation message"),
        }
    }
}

impl<T> Deref for DeprecatedInstance<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: fmt::Debug> fmt::Debug for DeprecatedInstance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeprecatedInstance")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("target", &self.target)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warnings::catch_warnings;
    use std::collections::HashMap;

    fn legacy_config() -> HashMap<&'static str, f64> {
        HashMap::from([("threshold", 0.5)])
    }

    #[test]
    fn access_warns_once_by_default() {
        let cfg = deprecated_instance("config_dict", legacy_config())
            .deprecated_in("1.0")
            .remove_in("2.0")
            .build()
            .unwrap();

        let ((), records) = catch_warnings(|| {
            assert_eq!(cfg["threshold"], 0.5);
            assert_eq!(cfg.len(), 1);
        });
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].message,
            "The `config_dict` was deprecated since v1.0. It will be removed in v2.0."
        );
        assert_eq!(cfg.warned(), 1);
    }

    #[test]
    fn access_is_redirected_to_target() {
        let mut replacement = legacy_config();
        replacement.insert("threshold", 0.9);
        let cfg = deprecated_instance("old_cfg", legacy_config())
            .target("new_cfg", replacement)
            .num_warns(-1)
            .build()
            .unwrap();

        let ((), records) = catch_warnings(|| {
            assert_eq!(cfg.get()["threshold"], 0.9);
            assert_eq!(cfg.get()["threshold"], 0.9);
        });
        assert_eq!(records.len(), 2);
        assert!(records[0].message.contains("in favor of `new_cfg`"));
    }

    #[test]
    fn read_only_refuses_mutation() {
        let mut cfg = deprecated_instance("frozen", legacy_config())
            .read_only(true)
            .stream(Stream::Disabled)
            .build()
            .unwrap();
        assert_eq!(
            cfg.get_mut().unwrap_err(),
            ProxyError::ReadOnly {
                name: "frozen".into()
            }
        );
    }

    #[test]
    fn mutation_goes_to_active_value() {
        let mut values = deprecated_instance("values", vec![1, 2])
            .stream(Stream::Disabled)
            .build()
            .unwrap();
        values.get_mut().unwrap().push(3);
        let (source, target) = values.into_inner();
        assert_eq!(source, vec![1, 2, 3]);
        assert!(target.is_none());
    }
}
