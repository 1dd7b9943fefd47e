//! Metadata scanner
//!
//! Walks a namespace, validates every deprecation wrapper it finds and
//! optionally descends into submodules of the same package. Members whose
//! name starts with `_` are private and skipped. A callable reachable under
//! several names (aliases, re-exports) is reported once.

use crate::namespace::{is_inside, Member, ModuleRef, Namespace};
use crate::validate::{validate_deprecated_callable, DeprecatedCallableInfo};
use deprecate_core::Callable;
use std::collections::HashSet;

/// Find and validate every deprecation wrapper in `namespace`
///
/// Class constructors and public methods are inspected as well. With
/// `recursive`, submodules inside the namespace's package are scanned too;
/// a submodule that fails to load is logged and skipped.
#[must_use]
pub fn find_deprecated_callables(namespace: &dyn Namespace, recursive: bool) -> Vec<DeprecatedCallableInfo> {
    let mut scanner = Scanner::new(recursive);
    scanner.visited.insert(namespace.namespace_name());
    scanner.scan(namespace);
    tracing::debug!(
        namespace = %namespace.namespace_name(),
        found = scanner.results.len(),
        "deprecation scan finished"
    );
    scanner.results
}

struct Scanner {
    recursive: bool,
    seen: HashSet<(String, String)>,
    visited: HashSet<String>,
    results: Vec<DeprecatedCallableInfo>,
}

impl Scanner {
    fn new(recursive: bool) -> Self {
        Self {
            recursive,
            seen: HashSet::new(),
            visited: HashSet::new(),
            results: Vec::new(),
        }
    }

    fn scan(&mut self, namespace: &dyn Namespace) {
        let package = namespace.namespace_name();
        let mut submodules = Vec::new();

        for (name, member) in namespace.enumerate_members() {
            if name.starts_with('_') {
                continue;
            }
            match member {
                Member::Callable(callable) => self.record(&callable),
                Member::Class(class) => {
                    self.record(class.constructor());
                    for (method_name, method) in class.methods() {
                        if !method_name.starts_with('_') {
                            self.record(method);
                        }
                    }
                }
                Member::Module(module) if self.recursive && is_inside(&package, module.name()) => {
                    submodules.push(module);
                }
                Member::Module(_) | Member::Value(_) => {}
            }
        }

        for module in submodules {
            self.descend(&module);
        }
    }

    fn descend(&mut self, module: &ModuleRef) {
        if !self.visited.insert(module.name().to_string()) {
            return;
        }
        match module.load() {
            Ok(loaded) => self.scan(&loaded),
            Err(err) => {
                tracing::warn!(module = %module.name(), error = %err, "skipping module that failed to load");
            }
        }
    }

    fn record(&mut self, callable: &Callable) {
        let Ok(info) = validate_deprecated_callable(callable) else {
            return;
        };
        if self.seen.insert((info.module.clone(), info.function.clone())) {
            self.results.push(info);
        }
    }
}
