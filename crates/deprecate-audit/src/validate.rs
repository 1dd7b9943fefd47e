//! Single-wrapper validation
//!
//! Checks whether one deprecation wrapper is configured to have any effect
//! and whether its target is itself deprecated.

use crate::error::AuditError;
use deprecate_core::{Callable, CallableKind, MetadataSummary, Target};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of deprecation chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainType {
    /// The target forwards to yet another callable; point at the final one
    Target,
    /// Argument mappings compose and should be collapsed into one wrapper
    Stacked,
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Target => "target",
            Self::Stacked => "stacked",
        })
    }
}

/// A deprecation wrapper and what validation found about it
#[derive(Debug, Clone, Serialize)]
pub struct DeprecatedCallableInfo {
    /// Defining module
    pub module: String,
    /// Qualified name; the class name for constructors
    pub function: String,
    /// The wrapper itself
    #[serde(skip)]
    pub callable: Callable,
    /// Wrapper configuration
    pub metadata: MetadataSummary,
    /// Mapping keys that are not parameters of the wrapped callable
    pub invalid_args: Vec<String>,
    /// No argument mapping at all
    pub empty_mapping: bool,
    /// Mapping keys mapped to themselves
    pub identity_mapping: Vec<String>,
    /// The wrapper forwards to itself
    pub self_reference: bool,
    /// The wrapper changes nothing about a call
    pub no_effect: bool,
    /// Chain the wrapper is part of
    pub chain_type: Option<ChainType>,
    /// Deprecated hops until a non-deprecated callable, zero without a chain
    pub chain_hops: usize,
}

impl DeprecatedCallableInfo {
    /// `module.function`
    #[must_use]
    pub fn path(&self) -> String {
        if self.module.is_empty() {
            self.function.clone()
        } else {
            format!("{}.{}", self.module, self.function)
        }
    }

    /// Version the callable goes away in
    #[must_use]
    pub fn remove_in(&self) -> Option<&str> {
        self.metadata.remove_in.as_deref()
    }

    /// Every mapping entry is an identity mapping
    #[must_use]
    pub fn all_identity(&self) -> bool {
        !self.identity_mapping.is_empty()
            && self.identity_mapping.len() == self.metadata.args_mapping.len()
    }
}

/// Validate the configuration of a deprecation wrapper
///
/// # Errors
/// [`AuditError::NotDeprecated`] if `callable` is not a wrapper
pub fn validate_deprecated_callable(callable: &Callable) -> Result<DeprecatedCallableInfo, AuditError> {
    let meta = callable
        .deprecation()
        .ok_or_else(|| AuditError::NotDeprecated(callable.qualified_path()))?;
    let mapping = meta.args_mapping();
    let target = meta.target();

    let signature = callable.signature();
    let invalid_args: Vec<String> = mapping
        .keys()
        .filter(|name| !signature.contains(name))
        .cloned()
        .collect();
    let identity_mapping: Vec<String> = mapping
        .iter()
        .filter(|(name, mapped)| mapped.is_identity(name))
        .map(|(name, _)| name.clone())
        .collect();
    let empty_mapping = mapping.is_empty();
    let all_identity = !empty_mapping && identity_mapping.len() == mapping.len();

    let self_reference = target
        .resolve()
        .is_some_and(|resolved| resolved.same_as(callable));
    let is_self_deprecation = target.is_self_reference() || self_reference;
    let no_effect = self_reference || (is_self_deprecation && (empty_mapping || all_identity));

    let chain_type = if self_reference {
        None
    } else {
        chain_step(callable).map(|(kind, _)| kind)
    };

    Ok(DeprecatedCallableInfo {
        module: callable.module().to_string(),
        function: function_name(callable),
        callable: callable.clone(),
        metadata: meta.summary(),
        invalid_args,
        empty_mapping,
        identity_mapping,
        self_reference,
        no_effect,
        chain_type,
        chain_hops: usize::from(chain_type.is_some()),
    })
}

/// Next deprecated callable a wrapper leads to, with the kind of link
///
/// A forwarding target that is a wrapper links as [`ChainType::Target`],
/// or [`ChainType::Stacked`] when that wrapper deprecates its own
/// arguments. An argument deprecation directly wrapping another argument
/// deprecation links as [`ChainType::Stacked`].
pub(crate) fn chain_step(callable: &Callable) -> Option<(ChainType, Callable)> {
    let meta = callable.deprecation()?;
    match meta.target() {
        Target::SelfReference => {
            let inner = callable.wrapped()?;
            inner
                .deprecation()
                .filter(|inner_meta| inner_meta.target().is_self_reference())
                .map(|_| (ChainType::Stacked, inner.clone()))
        }
        target => {
            let next = target.resolve()?;
            let next_meta = next.deprecation()?;
            let kind = if next_meta.target().is_self_reference() {
                ChainType::Stacked
            } else {
                ChainType::Target
            };
            Some((kind, next.clone()))
        }
    }
}

fn function_name(callable: &Callable) -> String {
    match callable.kind() {
        CallableKind::Constructor { class } => class.clone(),
        CallableKind::Function => callable.qualname().to_string(),
    }
}
