//! Namespaces the scanner walks
//!
//! A [`Module`] is an ordered table of named [`Member`]s: callables,
//! classes, submodules and plain values. Submodules can be registered
//! lazily; their loader runs on first access and the outcome, success or
//! [`ImportError`], is cached.

use crate::error::ImportError;
use deprecate_core::{Callable, Class};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Capability to list named members
///
/// Implemented by [`Module`] and [`Class`]; the scanner only needs this.
pub trait Namespace {
    /// Dotted name of the namespace
    fn namespace_name(&self) -> String;

    /// Members in declaration order
    fn enumerate_members(&self) -> Vec<(String, Member)>;
}

/// Named entry of a namespace
#[derive(Debug, Clone)]
pub enum Member {
    /// Function, possibly a deprecation wrapper
    Callable(Callable),
    /// Class with constructor and methods
    Class(Class),
    /// Nested or imported module
    Module(ModuleRef),
    /// Anything else
    Value(Value),
}

impl From<Callable> for Member {
    fn from(callable: Callable) -> Self {
        Self::Callable(callable)
    }
}

impl From<Class> for Member {
    fn from(class: Class) -> Self {
        Self::Class(class)
    }
}

impl From<Module> for Member {
    fn from(module: Module) -> Self {
        Self::Module(ModuleRef::Loaded(module))
    }
}

impl From<Value> for Member {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Reference to a module, loaded or not
#[derive(Debug, Clone)]
pub enum ModuleRef {
    /// Already available
    Loaded(Module),
    /// Loaded on first access
    Lazy(LazyModule),
}

impl ModuleRef {
    /// Dotted name of the referenced module
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Loaded(module) => module.name(),
            Self::Lazy(lazy) => lazy.name(),
        }
    }

    /// Get the module, running the loader if needed
    ///
    /// # Errors
    /// The loader's [`ImportError`], on this and every later call
    pub fn load(&self) -> Result<Module, ImportError> {
        match self {
            Self::Loaded(module) => Ok(module.clone()),
            Self::Lazy(lazy) => lazy.load(),
        }
    }
}

type LoaderFn = dyn Fn() -> Result<Module, ImportError> + Send + Sync;

struct LazyInner {
    name: String,
    loader: Box<LoaderFn>,
    cell: OnceCell<Result<Module, ImportError>>,
}

/// Module loaded on first access
#[derive(Clone)]
pub struct LazyModule(Arc<LazyInner>);

impl LazyModule {
    /// Register a loader for the module `name`
    pub fn new<F>(name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Module, ImportError> + Send + Sync + 'static,
    {
        Self(Arc::new(LazyInner {
            name: name.into(),
            loader: Box::new(loader),
            cell: OnceCell::new(),
        }))
    }

    /// Dotted module name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Check if the loader already ran
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.0.cell.get().is_some()
    }

    /// Run the loader once and return its cached outcome
    ///
    /// # Errors
    /// The loader's [`ImportError`]
    pub fn load(&self) -> Result<Module, ImportError> {
        self.0
            .cell
            .get_or_init(|| {
                tracing::debug!(module = %self.0.name, "loading module");
                (self.0.loader)()
            })
            .clone()
    }
}

impl fmt::Debug for LazyModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyModule")
            .field("name", &self.0.name)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[derive(Debug)]
struct ModuleInner {
    name: String,
    doc: Option<String>,
    version: Option<String>,
    members: IndexMap<String, Member>,
}

/// Shared module handle
#[derive(Debug, Clone)]
pub struct Module(Arc<ModuleInner>);

impl Module {
    /// Start building the module `name` (a dotted path)
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            name: name.into(),
            doc: None,
            version: None,
            members: IndexMap::new(),
        }
    }

    /// Dotted module name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Top-level package, the first path segment
    #[must_use]
    pub fn package(&self) -> &str {
        self.0.name.split('.').next().unwrap_or_default()
    }

    /// Documentation
    #[inline]
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.0.doc.as_deref()
    }

    /// Declared version (`__version__`)
    #[inline]
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.0.version.as_deref()
    }

    /// Member by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.0.members.get(name)
    }

    /// Members in declaration order
    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.0.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Module members that live inside this package
    ///
    /// Imported modules from elsewhere are members too but are not
    /// submodules.
    pub fn submodules(&self) -> impl Iterator<Item = &ModuleRef> {
        self.0.members.values().filter_map(move |member| match member {
            Member::Module(module) if self.contains_path(module.name()) => Some(module),
            _ => None,
        })
    }

    /// Check if `path` lies strictly inside this package
    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        is_inside(&self.0.name, path)
    }

    /// Check if both handles refer to the same module
    #[inline]
    #[must_use]
    pub fn same_as(&self, other: &Module) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Namespace for Module {
    fn namespace_name(&self) -> String {
        self.0.name.clone()
    }

    fn enumerate_members(&self) -> Vec<(String, Member)> {
        self.0
            .members
            .iter()
            .map(|(name, member)| (name.clone(), member.clone()))
            .collect()
    }
}

impl Namespace for Class {
    fn namespace_name(&self) -> String {
        self.path()
    }

    fn enumerate_members(&self) -> Vec<(String, Member)> {
        self.methods()
            .map(|(name, method)| (name.to_string(), Member::Callable(method.clone())))
            .collect()
    }
}

/// Builder for [`Module`]
#[derive(Debug)]
pub struct ModuleBuilder {
    name: String,
    doc: Option<String>,
    version: Option<String>,
    members: IndexMap<String, Member>,
}

impl ModuleBuilder {
    /// Documentation
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Declared version
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a function under its own name
    #[must_use]
    pub fn function(self, callable: Callable) -> Self {
        let name = callable.name().to_string();
        self.member(name, callable)
    }

    /// Add a class under its own name
    #[must_use]
    pub fn class(self, class: Class) -> Self {
        let name = class.name().to_string();
        self.member(name, class)
    }

    /// Add a loaded submodule under the last segment of its name
    #[must_use]
    pub fn submodule(self, module: Module) -> Self {
        let name = last_segment(module.name()).to_string();
        self.member(name, module)
    }

    /// Add a submodule loaded on first access
    ///
    /// `name` is the full dotted path of the submodule.
    #[must_use]
    pub fn lazy_submodule<F>(self, name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Module, ImportError> + Send + Sync + 'static,
    {
        let lazy = LazyModule::new(name, loader);
        let key = last_segment(lazy.name()).to_string();
        self.member(key, Member::Module(ModuleRef::Lazy(lazy)))
    }

    /// Add a plain value
    #[must_use]
    pub fn value(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.member(name, Member::Value(value.into()))
    }

    /// Add any member under an explicit name, e.g. an alias or re-export
    #[must_use]
    pub fn member(mut self, name: impl Into<String>, member: impl Into<Member>) -> Self {
        self.members.insert(name.into(), member.into());
        self
    }

    /// Finish
    #[must_use]
    pub fn build(self) -> Module {
        Module(Arc::new(ModuleInner {
            name: self.name,
            doc: self.doc,
            version: self.version,
            members: self.members,
        }))
    }
}

pub(crate) fn is_inside(package: &str, path: &str) -> bool {
    path.strip_prefix(package)
        .is_some_and(|rest| rest.starts_with('.') && rest.len() > 1)
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deprecate_core::Parameter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn helper(module: &str) -> Callable {
        Callable::builder("helper")
            .module(module)
            .param(Parameter::required("x"))
            .declared()
    }

    #[test]
    fn builder_keys_members_by_short_name() {
        let inner = Module::builder("pkg.inner").function(helper("pkg.inner")).build();
        let pkg = Module::builder("pkg")
            .version("1.2")
            .submodule(inner)
            .value("CONSTANT", 3)
            .member("alias", helper("pkg"))
            .build();

        let names: Vec<_> = pkg.members().map(|(name, _)| name).collect();
        assert_eq!(names, ["inner", "CONSTANT", "alias"]);
        assert_eq!(pkg.version(), Some("1.2"));
        assert_eq!(pkg.package(), "pkg");
        assert!(matches!(pkg.get("inner"), Some(Member::Module(_))));
    }

    #[test]
    fn submodules_exclude_foreign_imports() {
        let foreign = Module::builder("other.util").build();
        let sibling = Module::builder("pkgx").build();
        let own = Module::builder("pkg.sub").build();
        let pkg = Module::builder("pkg")
            .submodule(foreign)
            .member("pkgx", sibling)
            .submodule(own)
            .build();

        let subs: Vec<_> = pkg.submodules().map(ModuleRef::name).collect();
        assert_eq!(subs, ["pkg.sub"]);
    }

    #[test]
    fn lazy_loader_runs_once_even_on_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let lazy = LazyModule::new("pkg.broken", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ImportError::load_failed("pkg.broken", "boom"))
        });

        assert!(!lazy.is_loaded());
        assert!(lazy.load().is_err());
        assert!(lazy.load().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(lazy.is_loaded());
    }

    #[test]
    fn class_namespace_lists_methods() {
        let class = Class::builder("Shape")
            .module("geo")
            .method(Callable::builder("area").qualname("Shape.area").declared())
            .build();
        let members = class.enumerate_members();
        assert_eq!(class.namespace_name(), "geo.Shape");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].0, "area");
    }
}
