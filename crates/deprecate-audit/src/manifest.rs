//! Declarative module manifests
//!
//! A manifest describes modules, their functions and classes, and how each
//! is deprecated, in JSON or TOML. Loading it yields a [`ModuleRegistry`]
//! the audit can run on. Bodies are inert: calling a manifest callable
//! fails with `NotExecutable`.
//!
//! ```toml
//! [versions]
//! pkg = "1.0"
//!
//! [[modules]]
//! name = "pkg"
//!
//! [[modules.functions]]
//! name = "new_sum"
//! params = [{ name = "a" }, { name = "b", default = 3 }]
//!
//! [[modules.functions]]
//! name = "old_sum"
//! params = [{ name = "a" }, { name = "b", default = 5 }]
//! deprecated = { target = "pkg.new_sum", deprecated_in = "0.5", remove_in = "1.0" }
//! ```
//!
//! A target is a dotted path of a declared function or class, `"self"`
//! for an argument deprecation, or absent for a warn-only wrapper. Listing
//! several `deprecated` tables stacks wrappers, innermost first.

use crate::error::ManifestError;
use crate::namespace::{Member, Module};
use crate::registry::ModuleRegistry;
use deprecate_core::{
    deprecated, ArgMap, ArgsMapping, Callable, Class, DeferredTarget, Deprecated, Kwargs, Parameter,
    Signature, Stream, Target, WarningCategory,
};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Target value that selects an argument deprecation
pub const SELF_TARGET: &str = "self";

/// Whole manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Installed distribution versions
    #[serde(default)]
    pub versions: IndexMap<String, String>,
    /// Module declarations
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

/// One module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    /// Dotted module name
    pub name: String,
    /// Documentation
    #[serde(default)]
    pub doc: Option<String>,
    /// Declared version
    #[serde(default)]
    pub version: Option<String>,
    /// Functions
    #[serde(default)]
    pub functions: Vec<FunctionSpec>,
    /// Classes
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
    /// Extra names for declared functions or classes: alias -> dotted path
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
}

/// One function or method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionSpec {
    /// Bare name
    pub name: String,
    /// Documentation
    #[serde(default)]
    pub doc: Option<String>,
    /// Parameters in order
    #[serde(default)]
    pub params: Vec<Parameter>,
    /// Deprecations, innermost first
    #[serde(default, deserialize_with = "one_or_many")]
    pub deprecated: Vec<DeprecationSpec>,
}

/// One class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassSpec {
    /// Class name
    pub name: String,
    /// Documentation
    #[serde(default)]
    pub doc: Option<String>,
    /// Constructor parameters
    #[serde(default)]
    pub init: Vec<Parameter>,
    /// Methods
    #[serde(default)]
    pub methods: Vec<FunctionSpec>,
    /// Deprecations of the constructor, innermost first
    #[serde(default, deserialize_with = "one_or_many")]
    pub deprecated: Vec<DeprecationSpec>,
}

/// Where a manifest wrapper sends its messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamSpec {
    /// The warnings mechanism
    #[default]
    Warn,
    /// A `tracing` event at `WARN`
    Log,
    /// Nowhere
    Disabled,
}

/// One deprecation wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeprecationSpec {
    /// Dotted path, `"self"`, or absent
    #[serde(default)]
    pub target: Option<String>,
    /// Version the deprecation started in
    #[serde(default)]
    pub deprecated_in: Option<String>,
    /// Version the callable goes away in
    #[serde(default)]
    pub remove_in: Option<String>,
    /// Argument renames; `null` drops an argument
    #[serde(default)]
    pub args_mapping: ArgsMapping,
    /// Arguments to drop, for formats without `null`
    #[serde(default)]
    pub dropped_args: Vec<String>,
    /// Fixed extra arguments
    #[serde(default)]
    pub args_extra: Kwargs,
    /// Warning budget
    #[serde(default = "default_num_warns")]
    pub num_warns: i64,
    /// Message sink
    #[serde(default)]
    pub stream: StreamSpec,
    /// Category for the warnings sink
    #[serde(default)]
    pub category: Option<WarningCategory>,
    /// Never warn nor forward
    #[serde(default)]
    pub skip: bool,
    /// Custom message template
    #[serde(default)]
    pub template: Option<String>,
    /// Append a notice to the documentation
    #[serde(default)]
    pub update_docstring: bool,
}

fn default_num_warns() -> i64 {
    1
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<DeprecationSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Box<DeprecationSpec>),
        Many(Vec<DeprecationSpec>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(spec) => vec![*spec],
        OneOrMany::Many(specs) => specs,
    })
}

impl Manifest {
    /// Parse JSON text
    ///
    /// # Errors
    /// [`ManifestError::Json`] on malformed input
    pub fn from_json_str(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// [`ManifestError::Toml`] on malformed input
    pub fn from_toml_str(text: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a `.json` or `.toml` file
    ///
    /// # Errors
    /// IO, parse, or [`ManifestError::UnsupportedFormat`] errors
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !matches!(extension.as_str(), "json" | "toml") {
            return Err(ManifestError::UnsupportedFormat(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|err| ManifestError::io_error(path, err))?;
        tracing::debug!(path = %path.display(), "loading manifest");
        if extension == "json" {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }

    /// Build the declared modules into a fresh registry
    ///
    /// # Errors
    /// See [`Manifest::register_into`]
    pub fn into_registry(&self) -> Result<ModuleRegistry, ManifestError> {
        let registry = ModuleRegistry::new();
        self.register_into(&registry)?;
        Ok(registry)
    }

    /// Build the declared modules and register the top-level ones
    ///
    /// A module whose parent is declared too becomes its submodule.
    ///
    /// # Errors
    /// - [`ManifestError::Duplicate`] for a path declared twice
    /// - [`ManifestError::UnknownTarget`] for a target or alias naming nothing
    /// - [`ManifestError::Configuration`] for a rejected deprecation
    pub fn register_into(&self, registry: &ModuleRegistry) -> Result<(), ManifestError> {
        let mut linker = Linker::default();
        let mut members: HashMap<&str, Vec<(String, Member)>> = HashMap::new();

        for module in &self.modules {
            if members.contains_key(module.name.as_str()) {
                return Err(ManifestError::Duplicate(module.name.clone()));
            }
            let mut entries = Vec::new();
            for function in &module.functions {
                let callable = linker.function(&module.name, None, function)?;
                entries.push((function.name.clone(), Member::Callable(callable)));
            }
            for class in &module.classes {
                let class = linker.class(&module.name, class)?;
                entries.push((class.name().to_string(), Member::Class(class)));
            }
            members.insert(&module.name, entries);
        }

        linker.bind_targets()?;

        for module in &self.modules {
            let Some(entries) = members.get_mut(module.name.as_str()) else {
                continue;
            };
            for (alias, path) in &module.aliases {
                let member = linker.lookup(path).ok_or_else(|| ManifestError::UnknownTarget {
                    function: join(&module.name, alias),
                    target: path.clone(),
                })?;
                entries.push((alias.clone(), member));
            }
        }

        for module in assemble(&self.modules, members) {
            registry.register(module);
        }
        for (package, version) in &self.versions {
            registry.register_distribution(package.clone(), version.clone());
        }
        tracing::debug!(
            modules = self.modules.len(),
            callables = linker.callables.len(),
            "manifest loaded"
        );
        Ok(())
    }
}

#[derive(Default)]
struct Linker {
    callables: IndexMap<String, Callable>,
    classes: IndexMap<String, Class>,
    pending: Vec<(String, DeferredTarget)>,
}

impl Linker {
    fn function(
        &mut self,
        module: &str,
        class: Option<&str>,
        spec: &FunctionSpec,
    ) -> Result<Callable, ManifestError> {
        let qualname = match class {
            Some(class) => format!("{class}.{}", spec.name),
            None => spec.name.clone(),
        };
        let path = join(module, &qualname);
        if self.callables.contains_key(&path) {
            return Err(ManifestError::Duplicate(path));
        }

        let mut builder = Callable::builder(spec.name.clone())
            .module(module)
            .qualname(qualname)
            .signature(Signature::new(spec.params.iter().cloned()));
        if let Some(doc) = &spec.doc {
            builder = builder.doc(doc.clone());
        }
        let mut callable = builder.declared();
        for deprecation in &spec.deprecated {
            callable = self
                .configure(&path, deprecation)
                .wrap(&callable)
                .map_err(|source| ManifestError::Configuration {
                    function: path.clone(),
                    source,
                })?;
        }
        self.callables.insert(path, callable.clone());
        Ok(callable)
    }

    fn class(&mut self, module: &str, spec: &ClassSpec) -> Result<Class, ManifestError> {
        let path = join(module, &spec.name);
        if self.classes.contains_key(&path) || self.callables.contains_key(&path) {
            return Err(ManifestError::Duplicate(path));
        }

        let mut builder = Class::builder(spec.name.clone())
            .module(module)
            .init_declared(Signature::new(spec.init.iter().cloned()));
        if let Some(doc) = &spec.doc {
            builder = builder.doc(doc.clone());
        }
        for method in &spec.methods {
            builder = builder.method(self.function(module, Some(&spec.name), method)?);
        }
        let mut class = builder.build();
        for deprecation in &spec.deprecated {
            class = self
                .configure(&path, deprecation)
                .wrap_class(&class)
                .map_err(|source| ManifestError::Configuration {
                    function: path.clone(),
                    source,
                })?;
        }
        self.callables.insert(path.clone(), class.constructor().clone());
        self.classes.insert(path, class.clone());
        Ok(class)
    }

    fn configure(&mut self, owner: &str, spec: &DeprecationSpec) -> Deprecated {
        let target = match spec.target.as_deref() {
            None => Target::Absent,
            Some(SELF_TARGET) => Target::SelfReference,
            Some(path) => {
                let slot = DeferredTarget::new(path);
                self.pending.push((owner.to_string(), slot.clone()));
                Target::Deferred(slot)
            }
        };
        let mut mapping = spec.args_mapping.clone();
        for name in &spec.dropped_args {
            mapping.insert(name.clone(), ArgMap::Drop);
        }
        let stream = match spec.stream {
            StreamSpec::Warn => Stream::Warn(spec.category.unwrap_or(WarningCategory::Future)),
            StreamSpec::Log => Stream::Log(tracing::Level::WARN),
            StreamSpec::Disabled => Stream::Disabled,
        };

        let mut config = deprecated(target)
            .args_mapping(mapping)
            .args_extra(spec.args_extra.clone())
            .num_warns(spec.num_warns)
            .stream(stream)
            .skip_if(spec.skip)
            .update_docstring(spec.update_docstring);
        if let Some(version) = &spec.deprecated_in {
            config = config.deprecated_in(version.clone());
        }
        if let Some(version) = &spec.remove_in {
            config = config.remove_in(version.clone());
        }
        if let Some(template) = &spec.template {
            config = config.template(template.clone());
        }
        config
    }

    fn bind_targets(&mut self) -> Result<(), ManifestError> {
        for (owner, slot) in self.pending.drain(..) {
            let target = self
                .callables
                .get(slot.path())
                .ok_or_else(|| ManifestError::UnknownTarget {
                    function: owner.clone(),
                    target: slot.path().to_string(),
                })?;
            slot.bind(target.clone())
                .map_err(|source| ManifestError::Configuration { function: owner, source })?;
        }
        Ok(())
    }

    fn lookup(&self, path: &str) -> Option<Member> {
        self.classes
            .get(path)
            .cloned()
            .map(Member::Class)
            .or_else(|| self.callables.get(path).cloned().map(Member::Callable))
    }
}

/// Nest declared modules under declared parents, deepest first
fn assemble(specs: &[ModuleSpec], mut members: HashMap<&str, Vec<(String, Member)>>) -> Vec<Module> {
    let mut order: Vec<&ModuleSpec> = specs.iter().collect();
    order.sort_by_key(|spec| std::cmp::Reverse(spec.name.matches('.').count()));

    let declared: std::collections::HashSet<&str> = specs.iter().map(|spec| spec.name.as_str()).collect();
    let mut children: HashMap<String, Vec<Module>> = HashMap::new();
    let mut roots = Vec::new();

    for spec in order {
        let mut builder = Module::builder(spec.name.clone());
        if let Some(doc) = &spec.doc {
            builder = builder.doc(doc.clone());
        }
        if let Some(version) = &spec.version {
            builder = builder.version(version.clone());
        }
        for (name, member) in members.remove(spec.name.as_str()).unwrap_or_default() {
            builder = builder.member(name, member);
        }
        for child in children.remove(&spec.name).unwrap_or_default() {
            builder = builder.submodule(child);
        }
        let module = builder.build();

        match spec.name.rsplit_once('.') {
            Some((parent, _)) if declared.contains(parent) => {
                children.entry(parent.to_string()).or_default().push(module);
            }
            _ => roots.push(module),
        }
    }
    roots.reverse();
    roots
}

fn join(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{module}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deprecate_core::CallError;

    const TOML: &str = r#"
[versions]
pkg = "1.0"

[[modules]]
name = "pkg"
version = "0.9"
aliases = { legacy_sum = "pkg.old_sum" }

[[modules.functions]]
name = "new_sum"
params = [{ name = "a" }, { name = "b", default = 3 }]

[[modules.functions]]
name = "old_sum"
doc = "Sum two numbers."
params = [{ name = "a" }, { name = "b", default = 5 }]
deprecated = { target = "pkg.new_sum", deprecated_in = "0.5", remove_in = "1.0" }

[[modules.functions]]
name = "renamed"
params = [{ name = "old" }, { name = "new", default = 0 }]

[[modules.functions.deprecated]]
target = "self"
args_mapping = { old = "new" }

[[modules.functions.deprecated]]
target = "self"
dropped_args = ["new"]

[[modules]]
name = "pkg.shapes"

[[modules.classes]]
name = "PastCls"
init = [{ name = "c" }]
deprecated = { deprecated_in = "0.2", remove_in = "0.4" }
"#;

    #[test]
    fn builds_nested_registry() {
        let registry = Manifest::from_toml_str(TOML).unwrap().into_registry().unwrap();
        assert_eq!(registry.module_names(), ["pkg"]);
        assert_eq!(registry.version_of("pkg").unwrap(), "1.0");

        let pkg = registry.import("pkg").unwrap();
        let Some(Member::Callable(old_sum)) = pkg.get("old_sum") else {
            panic!("old_sum missing");
        };
        let meta = old_sum.deprecation().unwrap();
        assert_eq!(meta.target().path(), "pkg.new_sum");
        assert!(meta.target().resolve().is_some());
        assert!(matches!(pkg.get("legacy_sum"), Some(Member::Callable(c)) if c.same_as(old_sum)));

        let shapes = registry.import("pkg.shapes").unwrap();
        let Some(Member::Class(class)) = shapes.get("PastCls") else {
            panic!("PastCls missing");
        };
        assert!(class.constructor().is_deprecated());
    }

    #[test]
    fn stacked_deprecations_wrap_in_order() {
        let registry = Manifest::from_toml_str(TOML).unwrap().into_registry().unwrap();
        let pkg = registry.import("pkg").unwrap();
        let Some(Member::Callable(renamed)) = pkg.get("renamed") else {
            panic!("renamed missing");
        };
        assert_eq!(renamed.layers().count(), 3);
        let outer = renamed.deprecation().unwrap();
        assert_eq!(outer.args_mapping().get("new"), Some(&ArgMap::Drop));
    }

    #[test]
    fn bodies_are_inert() {
        let registry = Manifest::from_toml_str(TOML).unwrap().into_registry().unwrap();
        let pkg = registry.import("pkg").unwrap();
        let Some(Member::Callable(new_sum)) = pkg.get("new_sum") else {
            panic!("new_sum missing");
        };
        let err = new_sum
            .call(&deprecate_core::Arguments::new().arg(1))
            .unwrap_err();
        assert!(matches!(err, CallError::NotExecutable(path) if path == "pkg.new_sum"));
    }

    #[test]
    fn json_null_drops_arguments() {
        let manifest = Manifest::from_json_str(
            r#"{"modules": [{"name": "m", "functions": [
                {"name": "f", "params": [{"name": "x"}],
                 "deprecated": {"target": "self", "args_mapping": {"x": null}}}
            ]}]}"#,
        )
        .unwrap();
        let spec = &manifest.modules[0].functions[0].deprecated[0];
        assert_eq!(spec.args_mapping.get("x"), Some(&ArgMap::Drop));
        assert_eq!(spec.num_warns, 1);
    }

    #[test]
    fn unknown_target_and_duplicates() {
        let unknown = Manifest::from_toml_str(
            r#"
[[modules]]
name = "m"
[[modules.functions]]
name = "f"
deprecated = { target = "m.missing" }
"#,
        )
        .unwrap();
        assert!(matches!(
            unknown.into_registry(),
            Err(ManifestError::UnknownTarget { function, target }) if function == "m.f" && target == "m.missing"
        ));

        let duplicate = Manifest::from_toml_str(
            r#"
[[modules]]
name = "m"
[[modules.functions]]
name = "f"
[[modules.functions]]
name = "f"
"#,
        )
        .unwrap();
        assert!(matches!(duplicate.into_registry(), Err(ManifestError::Duplicate(path)) if path == "m.f"));
    }

    #[test]
    fn invalid_num_warns_is_reported_with_owner() {
        let manifest = Manifest::from_toml_str(
            r#"
[[modules]]
name = "m"
[[modules.functions]]
name = "f"
deprecated = { num_warns = -5 }
"#,
        )
        .unwrap();
        assert!(matches!(
            manifest.into_registry(),
            Err(ManifestError::Configuration { function, .. }) if function == "m.f"
        ));
    }

    #[test]
    fn rejects_unknown_extension() {
        assert!(matches!(
            Manifest::load("modules.yaml"),
            Err(ManifestError::UnsupportedFormat(_))
        ));
    }
}
