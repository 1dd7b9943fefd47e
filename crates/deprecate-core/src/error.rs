//! Error types for deprecation wrappers
//!
//! Two failure kinds are fatal to a call and always propagate:
//! - [`ConfigurationError`]: malformed wrapper configuration, raised at
//!   decoration time or on the first call that observes it
//! - [`ArgumentMappingError`]: call arguments that cannot be reconciled
//!   with the forwarding target
//!
//! [`BindingError`] covers ordinary signature mismatches between a call and
//! the callable it was made against.

/// Malformed deprecation configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// `num_warns` outside of `-1`, `0` or a positive count
    #[error("`num_warns` must be -1 (unlimited), 0 (never) or a positive count, got {0}")]
    InvalidNumWarns(i64),

    /// Target specification that is not one of the accepted shapes
    #[error("invalid deprecation target `{0}`: expected none, self or a dotted callable path")]
    InvalidTarget(String),

    /// The `skip_if` predicate failed
    #[error("`skip_if` predicate of `{source_name}` failed: {reason}")]
    SkipPredicateFailed { source_name: String, reason: String },

    /// The `skip_if` predicate produced something other than a boolean
    #[error("`skip_if` predicate of `{source_name}` must return a boolean, got {found}")]
    SkipPredicateNotBoolean { source_name: String, found: String },

    /// A deferred target was called before it was bound
    #[error("deferred target `{path}` of `{source_name}` was never resolved")]
    UnresolvedTarget { source_name: String, path: String },

    /// A deferred target slot was bound twice
    #[error("deferred target `{0}` is already bound")]
    TargetAlreadyBound(String),

    /// Message template references a placeholder that is not provided
    #[error("unknown placeholder `{{{placeholder}}}` in message template")]
    UnknownPlaceholder { placeholder: String },

    /// A wrapper's resolved target is the wrapper itself
    #[error("deprecation wrapper `{0}` forwards to itself")]
    SelfForwarding(String),

    /// Forwarding left required target parameters without a value
    #[error("forwarding `{source_name}` to `{target}` leaves required arguments unfilled: {missing:?}")]
    MissingTargetArguments {
        source_name: String,
        target: String,
        missing: Vec<String>,
    },
}

/// Call arguments that the forwarding target does not accept
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed mapping of `{source_name}`, arguments missing in target `{target}`: {missing:?}")]
pub struct ArgumentMappingError {
    /// Deprecated callable the call was made against
    pub source_name: String,
    /// Dotted path of the forwarding target
    pub target: String,
    /// Argument names the target has no parameter for
    pub missing: Vec<String>,
}

/// Mismatch between call arguments and a signature
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// More positional arguments than positional parameters
    #[error("takes {expected} positional arguments but {given} were given")]
    TooManyPositional { expected: usize, given: usize },

    /// Same parameter filled positionally and by keyword
    #[error("got multiple values for argument `{0}`")]
    MultipleValues(String),

    /// Keyword without a matching parameter
    #[error("got an unexpected keyword argument `{0}`")]
    UnexpectedKeyword(String),

    /// Required parameters left without a value
    #[error("missing required arguments: {}", .0.join(", "))]
    MissingArguments(Vec<String>),
}

/// Refused access through a [`DeprecatedInstance`](crate::DeprecatedInstance)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    /// Mutation of a read-only legacy value
    #[error("you can read legacy state of `{name}`, but updates are no longer supported")]
    ReadOnly {
        /// Name the value was deprecated under
        name: String,
    },
}

/// Error raised by calling a [`Callable`](crate::Callable)
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// Wrapper configuration is malformed
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Arguments cannot be forwarded to the target
    #[error(transparent)]
    ArgumentMapping(#[from] ArgumentMappingError),

    /// Arguments do not match the callable's signature
    #[error("invalid call of `{callable}`: {source}")]
    Binding {
        /// Dotted path of the callable
        callable: String,
        /// Underlying mismatch
        #[source]
        source: BindingError,
    },

    /// Bound argument could not be converted to the requested type
    #[error("argument `{name}` has an unexpected value: {source}")]
    InvalidValue {
        /// Parameter name
        name: String,
        /// Conversion failure
        #[source]
        source: serde_json::Error,
    },

    /// Declared-only callable (e.g. loaded from a manifest) has no body
    #[error("`{0}` is declared without an implementation and cannot be executed")]
    NotExecutable(String),

    /// Failure raised by a callable body
    #[error("{0}")]
    Failed(String),
}

impl CallError {
    /// Create a body failure
    #[inline]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Check if the error is a configuration error
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if the error is an argument mapping error
    #[inline]
    #[must_use]
    pub fn is_argument_mapping(&self) -> bool {
        matches!(self, Self::ArgumentMapping(_))
    }

    /// Check if the error is a signature mismatch
    #[inline]
    #[must_use]
    pub fn is_binding(&self) -> bool {
        matches!(self, Self::Binding { .. })
    }
}
