//! Deprecation wrapper builder
//!
//! [`deprecated`] starts a [`Deprecated`] configuration. Applying it to a
//! callable with [`Deprecated::wrap`] (or to a class constructor with
//! [`Deprecated::wrap_class`]) produces a wrapper that keeps the wrapped
//! callable's identity, carries immutable [`WrapperMetadata`] and owns its
//! own warning counters.
//!
//! On every call a wrapper:
//! 1. evaluates `skip_if` and passes through untouched when it holds
//! 2. converts positional arguments to keywords
//! 3. asks the throttle whether to warn and emits through the stream
//! 4. runs the wrapped body or forwards to the target, reconciling arguments
//!
//! Wrappers stack: each layer keeps its own counters and mapping and the
//! outermost layer runs first.

use crate::arguments::{Arguments, Kwargs};
use crate::callable::{Callable, Class};
use crate::error::{CallError, ConfigurationError};
use crate::reconcile::{ArgMap, ArgsMapping, Reconciler};
use crate::stream::Stream;
use crate::target::Target;
use crate::template::{self, MessageContext};
use crate::throttle::{NumWarns, Throttle};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Fallible zero-argument predicate
pub type PredicateFn = dyn Fn() -> Result<bool, String> + Send + Sync;

/// Predicate producing an arbitrary value, which must be a boolean
pub type DynamicPredicateFn = dyn Fn() -> Value + Send + Sync;

/// Condition under which a wrapper is bypassed
#[derive(Clone, Default)]
pub enum SkipIf {
    /// Never skip
    #[default]
    Never,

    /// Static decision
    Flag(bool),

    /// Re-evaluated on every call; an `Err` is a configuration error
    Predicate(Arc<PredicateFn>),

    /// Re-evaluated on every call; anything but a boolean is a configuration
    /// error
    Dynamic(Arc<DynamicPredicateFn>),
}

impl SkipIf {
    /// Fallible predicate
    #[must_use]
    pub fn predicate(f: impl Fn() -> Result<bool, String> + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    /// Value-producing predicate
    #[must_use]
    pub fn dynamic(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(f))
    }

    /// Evaluate for one call
    ///
    /// # Errors
    /// - [`ConfigurationError::SkipPredicateFailed`] if the predicate fails
    /// - [`ConfigurationError::SkipPredicateNotBoolean`] for a non-boolean
    ///   result
    pub fn evaluate(&self, source_name: &str) -> Result<bool, ConfigurationError> {
        match self {
            Self::Never => Ok(false),
            Self::Flag(flag) => Ok(*flag),
            Self::Predicate(f) => f().map_err(|reason| ConfigurationError::SkipPredicateFailed {
                source_name: source_name.to_string(),
                reason,
            }),
            Self::Dynamic(f) => match f() {
                Value::Bool(flag) => Ok(flag),
                other => Err(ConfigurationError::SkipPredicateNotBoolean {
                    source_name: source_name.to_string(),
                    found: value_kind(&other).to_string(),
                }),
            },
        }
    }
}

impl From<bool> for SkipIf {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl fmt::Debug for SkipIf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("Never"),
            Self::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Start a deprecation configuration
///
/// ```
/// use deprecate_core::prelude::*;
/// use serde_json::json;
///
/// let new_sum = Callable::builder("new_sum")
///     .module("pkg")
///     .param(Parameter::required("a"))
///     .param(Parameter::optional("b", 3))
///     .body(|args| Ok(json!(args.extract::<i64>("a")? + args.extract::<i64>("b")?)));
/// let old_sum = Callable::builder("old_sum")
///     .module("pkg")
///     .param(Parameter::required("a"))
///     .param(Parameter::optional("b", 5))
///     .declared();
///
/// let old_sum = deprecated(&new_sum)
///     .deprecated_in("0.1")
///     .remove_in("0.5")
///     .wrap(&old_sum)
///     .unwrap();
///
/// let (value, warnings) = catch_warnings(|| old_sum.call(&Arguments::new().arg(1).arg(2)));
/// assert_eq!(value.unwrap(), json!(3));
/// assert_eq!(warnings.len(), 1);
/// ```
#[must_use]
pub fn deprecated(target: impl Into<Target>) -> Deprecated {
    Deprecated::new(target.into())
}

/// Deprecation configuration
#[derive(Debug, Clone)]
pub struct Deprecated {
    target: Target,
    deprecated_in: Option<String>,
    remove_in: Option<String>,
    args_mapping: ArgsMapping,
    args_extra: Kwargs,
    num_warns: i64,
    stream: Stream,
    skip_if: SkipIf,
    template: Option<String>,
    update_docstring: bool,
}

impl Deprecated {
    /// Configuration with default settings
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            deprecated_in: None,
            remove_in: None,
            args_mapping: ArgsMapping::new(),
            args_extra: Kwargs::new(),
            num_warns: 1,
            stream: Stream::default(),
            skip_if: SkipIf::Never,
            template: None,
            update_docstring: false,
        }
    }

    /// Version the deprecation started in
    #[must_use]
    pub fn deprecated_in(mut self, version: impl Into<String>) -> Self {
        self.deprecated_in = Some(version.into());
        self
    }

    /// Version the callable goes away in
    #[must_use]
    pub fn remove_in(mut self, version: impl Into<String>) -> Self {
        self.remove_in = Some(version.into());
        self
    }

    /// Replace the whole argument mapping
    #[must_use]
    pub fn args_mapping(mut self, mapping: ArgsMapping) -> Self {
        self.args_mapping = mapping;
        self
    }

    /// Map one source argument
    #[must_use]
    pub fn arg(mut self, source: impl Into<String>, mapped: impl Into<ArgMap>) -> Self {
        self.args_mapping.insert(source.into(), mapped.into());
        self
    }

    /// Replace the fixed extra arguments
    #[must_use]
    pub fn args_extra(mut self, extra: Kwargs) -> Self {
        self.args_extra = extra;
        self
    }

    /// Add one fixed extra argument
    #[must_use]
    pub fn extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args_extra.insert(name.into(), value.into());
        self
    }

    /// Warning budget: `-1` unlimited, `0` never, `n > 0` at most `n` times
    ///
    /// Validated when the configuration is applied.
    #[must_use]
    pub fn num_warns(mut self, count: i64) -> Self {
        self.num_warns = count;
        self
    }

    /// Where messages go
    #[must_use]
    pub fn stream(mut self, stream: Stream) -> Self {
        self.stream = stream;
        self
    }

    /// Bypass condition
    #[must_use]
    pub fn skip_if(mut self, skip_if: impl Into<SkipIf>) -> Self {
        self.skip_if = skip_if.into();
        self
    }

    /// Custom message template
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Append a deprecation notice to the documentation
    #[must_use]
    pub fn update_docstring(mut self, update: bool) -> Self {
        self.update_docstring = update;
        self
    }

    /// Build a wrapper around `source`
    ///
    /// # Errors
    /// [`ConfigurationError::InvalidNumWarns`] for a warning budget below `-1`,
    /// [`ConfigurationError::UnknownPlaceholder`] for a custom template naming
    /// a placeholder that is never provided
    pub fn wrap(&self, source: &Callable) -> Result<Callable, ConfigurationError> {
        let num_warns = NumWarns::from_count(self.num_warns)?;
        if let Some(placeholder) = self
            .template
            .as_deref()
            .and_then(|custom| template::unknown_placeholders(custom).into_iter().next())
        {
            return Err(ConfigurationError::UnknownPlaceholder { placeholder });
        }
        let metadata = WrapperMetadata {
            source_name: source.display_name().to_string(),
            qualname: source.qualname().to_string(),
            module: source.module().to_string(),
            target: self.target.clone(),
            deprecated_in: self.deprecated_in.clone(),
            remove_in: self.remove_in.clone(),
            args_mapping: self.args_mapping.clone(),
            args_extra: self.args_extra.clone(),
            num_warns,
            skip_if: self.skip_if.clone(),
            template: self.template.clone(),
            stream: self.stream.clone(),
            update_docstring: self.update_docstring,
        };
        let doc = source.doc().map(|doc| {
            if self.update_docstring {
                metadata.notice(doc)
            } else {
                doc.to_string()
            }
        });
        let throttle = Throttle::new(num_warns, self.args_mapping.keys().cloned());

        tracing::debug!(
            source = %source.qualified_path(),
            target = %self.target.path(),
            num_warns = num_warns.as_count(),
            "deprecation wrapper created"
        );

        Ok(Callable::from_wrapper(
            source,
            doc,
            Wrapper {
                source: source.clone(),
                metadata,
                throttle,
            },
        ))
    }

    /// Wrap the constructor of `class`
    ///
    /// Methods are left untouched, so the warning fires per instantiation.
    ///
    /// # Errors
    /// Same as [`Deprecated::wrap`]
    pub fn wrap_class(&self, class: &Class) -> Result<Class, ConfigurationError> {
        let constructor = self.wrap(class.constructor())?;
        let doc = class.doc().map(|doc| match constructor.deprecation() {
            Some(metadata) if self.update_docstring => metadata.notice(doc),
            _ => doc.to_string(),
        });
        Ok(class.with_constructor(constructor, doc))
    }
}

/// Immutable configuration attached to a wrapper
#[derive(Debug, Clone)]
pub struct WrapperMetadata {
    source_name: String,
    qualname: String,
    module: String,
    target: Target,
    deprecated_in: Option<String>,
    remove_in: Option<String>,
    args_mapping: ArgsMapping,
    args_extra: Kwargs,
    num_warns: NumWarns,
    skip_if: SkipIf,
    template: Option<String>,
    stream: Stream,
    update_docstring: bool,
}

impl WrapperMetadata {
    /// Display name of the wrapped callable (class name for constructors)
    #[inline]
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Qualified name of the wrapped callable
    #[inline]
    #[must_use]
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// Defining module of the wrapped callable
    #[inline]
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// `module.source_name`
    #[must_use]
    pub fn source_path(&self) -> String {
        if self.module.is_empty() {
            self.source_name.clone()
        } else {
            format!("{}.{}", self.module, self.source_name)
        }
    }

    /// Forwarding mode
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Version the deprecation started in
    #[inline]
    #[must_use]
    pub fn deprecated_in(&self) -> Option<&str> {
        self.deprecated_in.as_deref()
    }

    /// Version the callable goes away in
    #[inline]
    #[must_use]
    pub fn remove_in(&self) -> Option<&str> {
        self.remove_in.as_deref()
    }

    /// Argument mapping
    #[inline]
    #[must_use]
    pub fn args_mapping(&self) -> &ArgsMapping {
        &self.args_mapping
    }

    /// Fixed extra arguments
    #[inline]
    #[must_use]
    pub fn args_extra(&self) -> &Kwargs {
        &self.args_extra
    }

    /// Warning budget
    #[inline]
    #[must_use]
    pub fn num_warns(&self) -> NumWarns {
        self.num_warns
    }

    /// Bypass condition
    #[inline]
    #[must_use]
    pub fn skip_if(&self) -> &SkipIf {
        &self.skip_if
    }

    /// Custom template, if any
    #[inline]
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Message sink
    #[inline]
    #[must_use]
    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Whether the documentation carries a notice
    #[inline]
    #[must_use]
    pub fn update_docstring(&self) -> bool {
        self.update_docstring
    }

    /// Serializable view
    #[must_use]
    pub fn summary(&self) -> MetadataSummary {
        MetadataSummary {
            source_name: self.source_name.clone(),
            target: TargetSummary::from(&self.target),
            deprecated_in: self.deprecated_in.clone(),
            remove_in: self.remove_in.clone(),
            args_mapping: self.args_mapping.clone(),
            args_extra: self.args_extra.clone(),
            num_warns: self.num_warns,
            update_docstring: self.update_docstring,
        }
    }

    fn notice(&self, doc: &str) -> String {
        let target_path = self.target.path();
        template::append_notice(
            doc,
            self.deprecated_in().unwrap_or_default(),
            self.remove_in().unwrap_or_default(),
            Some(target_path.as_str()),
        )
    }

    /// Render the message for a call
    ///
    /// `used` lists the mapped arguments of an argument deprecation; it is
    /// ignored for forwarding and warn-only wrappers.
    ///
    /// # Errors
    /// [`ConfigurationError::UnknownPlaceholder`] from the template
    pub fn render_message(&self, used: &[&str]) -> Result<String, ConfigurationError> {
        let argument_deprecation = self.target.is_self_reference();
        let template = match (&self.template, argument_deprecation) {
            (Some(custom), _) => custom.as_str(),
            (None, true) => template::TEMPLATE_WARNING_ARGUMENTS,
            (None, false) if self.target.is_absent() => template::TEMPLATE_WARNING_NO_TARGET,
            (None, false) => template::TEMPLATE_WARNING_CALLABLE,
        };
        let argument_map = if argument_deprecation {
            template::argument_map(
                used.iter()
                    .filter_map(|name| self.args_mapping.get_key_value(*name)),
            )
        } else {
            String::new()
        };
        let source_path = self.source_path();
        let target_name = self.target.name();
        let target_path = self.target.path();

        template::render(
            template,
            &MessageContext {
                source_name: &self.source_name,
                source_path: &source_path,
                target_name: &target_name,
                target_path: &target_path,
                deprecated_in: self.deprecated_in().unwrap_or_default(),
                remove_in: self.remove_in().unwrap_or_default(),
                argument_map: &argument_map,
            },
        )
    }
}

/// Serializable description of a wrapper target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSummary {
    /// Warn only
    Absent,
    /// Argument deprecation on the wrapped body
    SelfReference,
    /// Forwarding to a replacement
    Callable {
        /// Dotted path of the replacement
        path: String,
        /// Whether the replacement is known
        resolved: bool,
    },
}

impl From<&Target> for TargetSummary {
    fn from(target: &Target) -> Self {
        match target {
            Target::Absent => Self::Absent,
            Target::SelfReference => Self::SelfReference,
            Target::Callable(_) | Target::Deferred(_) => Self::Callable {
                path: target.path(),
                resolved: target.resolve().is_some(),
            },
        }
    }
}

/// Serializable view of [`WrapperMetadata`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataSummary {
    /// Display name of the wrapped callable
    pub source_name: String,
    /// Forwarding mode
    pub target: TargetSummary,
    /// Version the deprecation started in
    pub deprecated_in: Option<String>,
    /// Version the callable goes away in
    pub remove_in: Option<String>,
    /// Argument mapping, `null` for dropped arguments
    pub args_mapping: ArgsMapping,
    /// Fixed extra arguments
    pub args_extra: Kwargs,
    /// Warning budget
    pub num_warns: NumWarns,
    /// Whether the documentation carries a notice
    pub update_docstring: bool,
}

/// Call-time state of a deprecation wrapper
pub(crate) struct Wrapper {
    source: Callable,
    metadata: WrapperMetadata,
    throttle: Throttle,
}

impl Wrapper {
    pub(crate) fn source(&self) -> &Callable {
        &self.source
    }

    pub(crate) fn metadata(&self) -> &WrapperMetadata {
        &self.metadata
    }

    pub(crate) fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    pub(crate) fn call(&self, this: &Callable, args: &Arguments) -> Result<Value, CallError> {
        let meta = &self.metadata;
        if meta.skip_if.evaluate(&meta.source_name)? {
            return self.source.call(args);
        }

        let kwargs = self
            .source
            .signature()
            .keywords_of(args)
            .map_err(|source| CallError::Binding {
                callable: self.source.qualified_path(),
                source,
            })?;

        let reconciler = Reconciler::new(&meta.args_mapping, &meta.args_extra);
        let argument_deprecation = meta.target.is_self_reference();
        let used = if meta.target.is_absent() {
            Vec::new()
        } else {
            reconciler.used_arguments(&kwargs)
        };
        if argument_deprecation && used.is_empty() {
            return self.source.call_keywords(kwargs);
        }

        if meta.stream.is_enabled() {
            let due = if argument_deprecation {
                self.throttle.acquire_arguments(used.iter().copied())
            } else {
                self.throttle.acquire_callable()
            };
            if due {
                let message = meta.render_message(&used)?;
                meta.stream.emit(&message);
            }
        }

        match &meta.target {
            Target::Absent => self.source.call_keywords(kwargs),
            Target::SelfReference => {
                let rebound = reconciler.with_extra(reconciler.rebind(kwargs));
                self.source.call_keywords(rebound)
            }
            Target::Callable(_) | Target::Deferred(_) => {
                let target = meta.target.resolve().ok_or_else(|| {
                    ConfigurationError::UnresolvedTarget {
                        source_name: meta.source_name.clone(),
                        path: meta.target.path(),
                    }
                })?;
                if target.same_as(this) {
                    return Err(ConfigurationError::SelfForwarding(this.qualified_path()).into());
                }
                let merged = self.source.signature().with_defaults(kwargs);
                let forwarded = reconciler.forward(
                    merged,
                    target.signature(),
                    &meta.source_name,
                    &target.path(),
                )?;
                target.call_keywords(forwarded)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Parameter;
    use crate::warnings::catch_warnings;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn plain(name: &str) -> Callable {
        Callable::builder(name)
            .module("pkg")
            .doc("Compute things.")
            .param(Parameter::optional("a", 0))
            .param(Parameter::optional("b", 0))
            .body(|args| Ok(json!({"a": args.get("a"), "b": args.get("b")})))
    }

    #[test]
    fn invalid_num_warns_rejected_at_wrap() {
        let err = deprecated(Target::Absent).num_warns(-5).wrap(&plain("f")).unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidNumWarns(-5));
    }

    #[test]
    fn wrapper_preserves_identity() {
        let source = plain("f");
        let wrapped = deprecated(Target::Absent).wrap(&source).unwrap();
        assert_eq!(wrapped.name(), "f");
        assert_eq!(wrapped.module(), "pkg");
        assert_eq!(wrapped.doc(), Some("Compute things."));
        assert_eq!(wrapped.signature(), source.signature());
        assert!(wrapped.wrapped().unwrap().same_as(&source));
        assert!(!wrapped.same_as(&source));
    }

    #[test]
    fn docstring_notice_is_appended() {
        let target = plain("g");
        let wrapped = deprecated(&target)
            .deprecated_in("0.2")
            .remove_in("0.3")
            .update_docstring(true)
            .wrap(&plain("f"))
            .unwrap();
        assert_eq!(
            wrapped.doc().unwrap(),
            "Compute things.\n\n.. deprecated:: 0.2\n   Will be removed in 0.3.\n   Use `pkg.g` instead."
        );
    }

    #[test]
    fn undocumented_callable_gets_no_notice() {
        let source = Callable::builder("f").body(|_| Ok(Value::Null));
        let wrapped = deprecated(Target::Absent).update_docstring(true).wrap(&source).unwrap();
        assert_eq!(wrapped.doc(), None);
    }

    #[test]
    fn skip_if_non_boolean_is_configuration_error() {
        let wrapped = deprecated(Target::Absent)
            .skip_if(SkipIf::dynamic(|| json!("yes")))
            .wrap(&plain("f"))
            .unwrap();
        let err = wrapped.call(&Arguments::new()).unwrap_err();
        assert!(matches!(
            err,
            CallError::Configuration(ConfigurationError::SkipPredicateNotBoolean { ref found, .. }) if found == "string"
        ));
    }

    #[test]
    fn skip_if_failure_propagates() {
        let wrapped = deprecated(Target::Absent)
            .skip_if(SkipIf::predicate(|| Err("lookup failed".into())))
            .wrap(&plain("f"))
            .unwrap();
        assert!(wrapped.call(&Arguments::new()).unwrap_err().is_configuration());
    }

    #[test]
    fn self_reference_without_mapped_arguments_is_silent() {
        let wrapped = deprecated(Target::SelfReference)
            .arg("a", "b")
            .wrap(&plain("f"))
            .unwrap();
        let (out, records) = catch_warnings(|| wrapped.call(&Arguments::new().kwarg("b", 2)));
        assert_eq!(out.unwrap(), json!({"a": 0, "b": 2}));
        assert!(records.is_empty());
        assert_eq!(wrapped.throttle().unwrap().warned_argument("a"), Some(0));
    }

    #[test]
    fn argument_message_lists_used_arguments() {
        let wrapped = deprecated(Target::SelfReference)
            .deprecated_in("0.1")
            .remove_in("0.2")
            .arg("a", "b")
            .wrap(&plain("f"))
            .unwrap();
        let (out, records) = catch_warnings(|| wrapped.call(&Arguments::new().kwarg("a", 7)));
        assert_eq!(out.unwrap(), json!({"a": 0, "b": 7}));
        assert_eq!(
            records[0].message,
            "The `f` uses deprecated arguments: `a` -> `b`. They were deprecated since v0.1 and will be removed in v0.2."
        );
    }

    #[test]
    fn unresolved_deferred_target_fails_loudly() {
        let slot = crate::target::DeferredTarget::new("pkg.later");
        let wrapped = deprecated(&slot).stream(Stream::Disabled).wrap(&plain("f")).unwrap();
        let err = wrapped.call(&Arguments::new()).unwrap_err();
        assert!(matches!(
            err,
            CallError::Configuration(ConfigurationError::UnresolvedTarget { ref path, .. }) if path == "pkg.later"
        ));
    }

    #[test]
    fn wrapper_targeting_itself_is_rejected() {
        let slot = crate::target::DeferredTarget::new("pkg.f");
        let wrapped = deprecated(&slot).stream(Stream::Disabled).wrap(&plain("f")).unwrap();
        slot.bind(wrapped.clone()).unwrap();
        let err = wrapped.call(&Arguments::new()).unwrap_err();
        assert!(matches!(
            err,
            CallError::Configuration(ConfigurationError::SelfForwarding(_))
        ));
    }

    #[test]
    fn summary_serializes() {
        let wrapped = deprecated(Target::SelfReference)
            .deprecated_in("1.0")
            .arg("a", ArgMap::Drop)
            .wrap(&plain("f"))
            .unwrap();
        let summary = wrapped.deprecation().unwrap().summary();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["target"], json!({"kind": "self_reference"}));
        assert_eq!(value["args_mapping"], json!({"a": null}));
        assert_eq!(value["num_warns"], json!(1));
    }

    #[test]
    fn custom_template_is_used() {
        let wrapped = deprecated(Target::Absent)
            .deprecated_in("0.3")
            .template("v{deprecated_in}: `{source_path}` is gone soon")
            .wrap(&plain("f"))
            .unwrap();
        let (_, records) = catch_warnings(|| wrapped.call(&Arguments::new()));
        assert_eq!(records[0].message, "v0.3: `pkg.f` is gone soon");
    }

    #[test]
    fn unknown_template_placeholder_rejected_at_wrap() {
        let err = deprecated(Target::Absent)
            .template("gone in {version}")
            .wrap(&plain("f"))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownPlaceholder {
                placeholder: "version".into()
            }
        );
    }

    #[test]
    fn custom_template_checked_for_classes() {
        let err = deprecated(Target::Absent)
            .template("{source_name} {nope}")
            .wrap_class(&Class::builder("C").module("pkg").build())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownPlaceholder { ref placeholder } if placeholder == "nope"));
    }

    #[test]
    fn argument_message_lists_every_used_mapping() {
        let wrapped = deprecated(Target::SelfReference)
            .deprecated_in("0.1")
            .remove_in("0.2")
            .arg("a", "x")
            .arg("b", "y")
            .wrap(
                &Callable::builder("f")
                    .module("pkg")
                    .param(Parameter::optional("a", 0))
                    .param(Parameter::optional("b", 0))
                    .param(Parameter::optional("x", 0))
                    .param(Parameter::optional("y", 0))
                    .body(|_| Ok(Value::Null)),
            )
            .unwrap();
        let (_, records) = catch_warnings(|| {
            wrapped.call(&Arguments::new().kwarg("a", 1)).unwrap();
            wrapped.call(&Arguments::new().kwarg("a", 1).kwarg("b", 2)).unwrap();
            wrapped.call(&Arguments::new().kwarg("a", 1).kwarg("b", 2)).unwrap();
        });
        let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "The `f` uses deprecated arguments: `a` -> `x`. \
                 They were deprecated since v0.1 and will be removed in v0.2.",
                "The `f` uses deprecated arguments: `a` -> `x`, `b` -> `y`. \
                 They were deprecated since v0.1 and will be removed in v0.2.",
            ]
        );
    }
}
