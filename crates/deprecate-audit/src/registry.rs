//! Dotted-path module registry
//!
//! [`ModuleRegistry`] resolves module paths the way an import system does
//! and knows the installed version of each distribution. The path-based
//! audit entry points live here.

use crate::chains::validate_deprecation_chains;
use crate::error::{AuditError, ImportError};
use crate::expiry::validate_deprecation_expiry;
use crate::namespace::{Member, Module};
use crate::scanner::find_deprecated_callables;
use crate::validate::DeprecatedCallableInfo;
use indexmap::IndexMap;
use parking_lot::RwLock;

/// Registered modules and distribution versions
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: RwLock<IndexMap<String, Module>>,
    distributions: RwLock<IndexMap<String, String>>,
}

impl ModuleRegistry {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under its name, replacing any previous one
    pub fn register(&self, module: Module) {
        tracing::debug!(module = %module.name(), "module registered");
        self.modules.write().insert(module.name().to_string(), module);
    }

    /// Record the installed version of a distribution
    pub fn register_distribution(&self, package: impl Into<String>, version: impl Into<String>) {
        self.distributions.write().insert(package.into(), version.into());
    }

    /// Names of registered top-level entries
    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        self.modules.read().keys().cloned().collect()
    }

    /// Resolve a dotted module path
    ///
    /// A path is either registered itself or reached from its longest
    /// registered prefix by following submodule members.
    ///
    /// # Errors
    /// [`ImportError::NotFound`] if nothing resolves, or a lazy loader's error
    pub fn import(&self, path: &str) -> Result<Module, ImportError> {
        let (mut module, rest) = {
            let modules = self.modules.read();
            if let Some(module) = modules.get(path) {
                return Ok(module.clone());
            }
            let mut prefix = path;
            loop {
                let Some((head, _)) = prefix.rsplit_once('.') else {
                    return Err(ImportError::NotFound(path.to_string()));
                };
                if let Some(module) = modules.get(head) {
                    break (module.clone(), &path[head.len() + 1..]);
                }
                prefix = head;
            }
        };

        for segment in rest.split('.') {
            module = match module.get(segment) {
                Some(Member::Module(submodule)) => submodule.load()?,
                _ => return Err(ImportError::NotFound(path.to_string())),
            };
        }
        Ok(module)
    }

    /// Installed version of `package`
    ///
    /// Distribution metadata wins over the version the package module
    /// declares.
    ///
    /// # Errors
    /// [`AuditError::VersionUnavailable`] if neither is known
    pub fn version_of(&self, package: &str) -> Result<String, AuditError> {
        if let Some(version) = self.distributions.read().get(package) {
            return Ok(version.clone());
        }
        self.import(package)
            .ok()
            .and_then(|module| module.version().map(str::to_string))
            .ok_or_else(|| AuditError::VersionUnavailable(package.to_string()))
    }

    /// [`find_deprecated_callables`] by module path
    ///
    /// # Errors
    /// [`AuditError::Import`] if the path does not resolve
    pub fn find_deprecated_callables(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<DeprecatedCallableInfo>, AuditError> {
        let module = self.import(path)?;
        Ok(find_deprecated_callables(&module, recursive))
    }

    /// [`validate_deprecation_expiry`] by module path
    ///
    /// Without `current_version` the version of the path's top-level
    /// package is looked up first.
    ///
    /// # Errors
    /// Version errors as for [`validate_deprecation_expiry`], or
    /// [`AuditError::Import`] if the path does not resolve
    pub fn validate_deprecation_expiry(
        &self,
        path: &str,
        current_version: Option<&str>,
        recursive: bool,
    ) -> Result<Vec<String>, AuditError> {
        let current = match current_version {
            Some(version) => version.to_string(),
            None => self.version_of(package_of(path))?,
        };
        let module = self.import(path)?;
        validate_deprecation_expiry(&module, Some(&current), recursive)
    }

    /// [`validate_deprecation_chains`] by module path
    ///
    /// # Errors
    /// Chain errors as for [`validate_deprecation_chains`], or
    /// [`AuditError::Import`] if the path does not resolve
    pub fn validate_deprecation_chains(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<DeprecatedCallableInfo>, AuditError> {
        let module = self.import(path)?;
        validate_deprecation_chains(&module, recursive)
    }
}

/// First segment of a dotted path
#[must_use]
pub fn package_of(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deprecate_core::{deprecated, Callable, Target};

    fn old(module: &str) -> Callable {
        let source = Callable::builder("old").module(module).declared();
        deprecated(Target::Absent).remove_in("1.0").wrap(&source).unwrap()
    }

    fn registry() -> ModuleRegistry {
        let registry = ModuleRegistry::new();
        let sub = Module::builder("pkg.sub").function(old("pkg.sub")).build();
        registry.register(
            Module::builder("pkg")
                .version("0.9")
                .submodule(sub)
                .lazy_submodule("pkg.lazy", || {
                    Err(ImportError::load_failed("pkg.lazy", "missing dependency"))
                })
                .build(),
        );
        registry
    }

    #[test]
    fn import_walks_submodules() {
        let registry = registry();
        assert_eq!(registry.import("pkg").unwrap().name(), "pkg");
        assert_eq!(registry.import("pkg.sub").unwrap().name(), "pkg.sub");
        assert_eq!(
            registry.import("pkg.nope").unwrap_err(),
            ImportError::NotFound("pkg.nope".into())
        );
        assert_eq!(
            registry.import("elsewhere").unwrap_err(),
            ImportError::NotFound("elsewhere".into())
        );
        assert!(matches!(
            registry.import("pkg.lazy"),
            Err(ImportError::LoadFailed { .. })
        ));
    }

    #[test]
    fn distribution_version_wins() {
        let registry = registry();
        assert_eq!(registry.version_of("pkg").unwrap(), "0.9");
        registry.register_distribution("pkg", "1.0");
        assert_eq!(registry.version_of("pkg").unwrap(), "1.0");
        assert_eq!(
            registry.version_of("ghost").unwrap_err(),
            AuditError::VersionUnavailable("ghost".into())
        );
    }

    #[test]
    fn path_based_expiry_uses_package_version() {
        let registry = registry();
        assert!(registry
            .validate_deprecation_expiry("pkg.sub", None, true)
            .unwrap()
            .is_empty());
        registry.register_distribution("pkg", "1.0");
        assert_eq!(
            registry
                .validate_deprecation_expiry("pkg.sub", None, true)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn path_based_scan() {
        let registry = registry();
        let found = registry.find_deprecated_callables("pkg", true).unwrap();
        assert_eq!(found.len(), 1);
        assert!(matches!(
            registry.find_deprecated_callables("missing", true),
            Err(AuditError::Import(ImportError::NotFound(_)))
        ));
    }
}
