//! Deprecation chain detection
//!
//! A wrapper that forwards to another deprecated callable, or that stacks
//! argument deprecations, makes callers traverse several hops. The walk
//! follows forwarding targets and stacked layers until it reaches a
//! callable that is not part of a chain.

use crate::error::AuditError;
use crate::namespace::Namespace;
use crate::scanner::find_deprecated_callables;
use crate::validate::{chain_step, DeprecatedCallableInfo};
use deprecate_core::Callable;
use std::collections::HashSet;

/// Longest chain walked before giving up
pub const MAX_CHAIN_DEPTH: usize = 32;

/// Wrappers in `namespace` that are part of a chain
///
/// Each finding carries the total number of deprecated hops.
///
/// # Errors
/// - [`AuditError::ChainCycle`] if targets loop back
/// - [`AuditError::ChainTooDeep`] beyond [`MAX_CHAIN_DEPTH`] hops
pub fn validate_deprecation_chains(
    namespace: &dyn Namespace,
    recursive: bool,
) -> Result<Vec<DeprecatedCallableInfo>, AuditError> {
    chains_in(find_deprecated_callables(namespace, recursive), MAX_CHAIN_DEPTH)
}

/// Chain findings among already scanned wrappers
///
/// # Errors
/// Same as [`validate_deprecation_chains`], with `max_depth` as the bound
pub fn chains_in(
    found: impl IntoIterator<Item = DeprecatedCallableInfo>,
    max_depth: usize,
) -> Result<Vec<DeprecatedCallableInfo>, AuditError> {
    found
        .into_iter()
        .filter(|info| info.chain_type.is_some())
        .map(|mut info| {
            info.chain_hops = chain_hops(&info.callable, max_depth)?;
            Ok(info)
        })
        .collect()
}

/// Number of deprecated hops from `start` to the end of its chain
///
/// # Errors
/// - [`AuditError::ChainCycle`] if a callable is reached twice
/// - [`AuditError::ChainTooDeep`] beyond `max_depth` hops
pub fn chain_hops(start: &Callable, max_depth: usize) -> Result<usize, AuditError> {
    let mut visited = HashSet::from([start.id()]);
    let mut path = vec![start.qualified_path()];
    let mut current = start.clone();
    let mut hops = 0;

    while let Some((_, next)) = chain_step(&current) {
        path.push(next.qualified_path());
        if !visited.insert(next.id()) {
            return Err(AuditError::ChainCycle {
                start: start.qualified_path(),
                path,
            });
        }
        hops += 1;
        if hops > max_depth {
            return Err(AuditError::ChainTooDeep {
                start: start.qualified_path(),
                max_depth,
            });
        }
        current = next;
    }
    tracing::trace!(start = %start.qualified_path(), hops, "chain walked");
    Ok(hops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::Module;
    use crate::validate::ChainType;
    use deprecate_core::{deprecated, DeferredTarget, Parameter, Target};

    fn declared(name: &str) -> Callable {
        Callable::builder(name)
            .module("chains")
            .param(Parameter::optional("a", 1))
            .param(Parameter::optional("b", 2))
            .declared()
    }

    #[test]
    fn counts_hops_through_forwarding_targets() {
        let base = declared("base");
        let first = deprecated(&base).wrap(&declared("first")).unwrap();
        let second = deprecated(&first).wrap(&declared("second")).unwrap();
        let third = deprecated(&second).wrap(&declared("third")).unwrap();

        assert_eq!(chain_hops(&first, MAX_CHAIN_DEPTH).unwrap(), 0);
        assert_eq!(chain_hops(&second, MAX_CHAIN_DEPTH).unwrap(), 1);
        assert_eq!(chain_hops(&third, MAX_CHAIN_DEPTH).unwrap(), 2);
        assert_eq!(
            chain_hops(&third, 1).unwrap_err(),
            AuditError::ChainTooDeep {
                start: "chains.third".into(),
                max_depth: 1
            }
        );
    }

    #[test]
    fn module_chains() {
        let base = declared("base");
        let callee = deprecated(&base).wrap(&declared("callee")).unwrap();
        let renaming = deprecated(Target::SelfReference)
            .arg("a", "b")
            .wrap(&declared("callee_args"))
            .unwrap();
        let module = Module::builder("chains")
            .function(base)
            .function(callee.clone())
            .function(renaming.clone())
            .function(deprecated(&callee).wrap(&declared("caller")).unwrap())
            .function(deprecated(&renaming).wrap(&declared("caller_args")).unwrap())
            .build();

        let found = validate_deprecation_chains(&module, true).unwrap();
        let summary: Vec<_> = found
            .iter()
            .map(|info| (info.function.as_str(), info.chain_type, info.chain_hops))
            .collect();
        assert_eq!(
            summary,
            [
                ("caller", Some(ChainType::Target), 1),
                ("caller_args", Some(ChainType::Stacked), 1),
            ]
        );
    }

    #[test]
    fn cycles_are_errors() {
        let slot_a = DeferredTarget::new("chains.a");
        let slot_b = DeferredTarget::new("chains.b");
        let a = deprecated(&slot_b).wrap(&declared("a")).unwrap();
        let b = deprecated(&slot_a).wrap(&declared("b")).unwrap();
        slot_a.bind(a.clone()).unwrap();
        slot_b.bind(b.clone()).unwrap();

        let module = Module::builder("chains").function(a).function(b).build();
        let err = validate_deprecation_chains(&module, false).unwrap_err();
        assert_eq!(
            err,
            AuditError::ChainCycle {
                start: "chains.a".into(),
                path: vec!["chains.a".into(), "chains.b".into(), "chains.a".into()],
            }
        );
    }

    #[test]
    fn chain_free_module_reports_nothing() {
        let base = declared("base");
        let module = Module::builder("chains")
            .function(deprecated(&base).wrap(&declared("old")).unwrap())
            .function(base)
            .build();
        assert!(validate_deprecation_chains(&module, true).unwrap().is_empty());
    }
}
