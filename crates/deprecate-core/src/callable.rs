//! Callable and class handles
//!
//! A [`Callable`] is a cheaply clonable handle to a named function with an
//! explicit [`Signature`]. Its implementation is a native body, a declared
//! stub without body, or a deprecation wrapper around another callable.
//! Identity is pointer identity of the handle: clones are the same object,
//! two separately built callables never are.

use crate::arguments::{Arguments, BoundArguments, Kwargs};
use crate::deprecation::{Wrapper, WrapperMetadata};
use crate::error::CallError;
use crate::signature::{Parameter, Signature};
use crate::throttle::Throttle;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Native callable body
pub type BodyFn = dyn Fn(&BoundArguments) -> Result<Value, CallError> + Send + Sync;

/// What a callable is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallableKind {
    /// Free function or method
    Function,

    /// Initializer of the named class
    Constructor {
        /// Class name
        class: String,
    },
}

pub(crate) enum Implementation {
    Native(Arc<BodyFn>),
    Declared,
    Wrapper(Wrapper),
}

struct CallableInner {
    name: String,
    qualname: String,
    module: String,
    doc: Option<String>,
    signature: Signature,
    kind: CallableKind,
    implementation: Implementation,
}

/// Shared callable handle
#[derive(Clone)]
pub struct Callable(Arc<CallableInner>);

impl Callable {
    /// Start building a function
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CallableBuilder {
        CallableBuilder::new(name)
    }

    pub(crate) fn from_wrapper(source: &Callable, doc: Option<String>, wrapper: Wrapper) -> Self {
        Self(Arc::new(CallableInner {
            name: source.0.name.clone(),
            qualname: source.0.qualname.clone(),
            module: source.0.module.clone(),
            doc,
            signature: source.0.signature.clone(),
            kind: source.0.kind.clone(),
            implementation: Implementation::Wrapper(wrapper),
        }))
    }

    /// Bare name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Qualified name inside its module (`Class.method`)
    #[inline]
    #[must_use]
    pub fn qualname(&self) -> &str {
        &self.0.qualname
    }

    /// Defining module
    #[inline]
    #[must_use]
    pub fn module(&self) -> &str {
        &self.0.module
    }

    /// Documentation
    #[inline]
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.0.doc.as_deref()
    }

    /// Parameter list
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.0.signature
    }

    /// Function or constructor
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &CallableKind {
        &self.0.kind
    }

    /// Name used in messages: the class name for constructors
    #[must_use]
    pub fn display_name(&self) -> &str {
        match &self.0.kind {
            CallableKind::Constructor { class } => class,
            CallableKind::Function => &self.0.name,
        }
    }

    /// `module.display_name`
    #[must_use]
    pub fn path(&self) -> String {
        join_path(&self.0.module, self.display_name())
    }

    /// `module.qualname`
    #[must_use]
    pub fn qualified_path(&self) -> String {
        join_path(&self.0.module, &self.0.qualname)
    }

    /// Check if both handles refer to the same object
    #[inline]
    #[must_use]
    pub fn same_as(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Stable identity of the underlying object
    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }

    /// Check if this is a deprecation wrapper
    #[inline]
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        matches!(self.0.implementation, Implementation::Wrapper(_))
    }

    /// Check if this callable has an executable body
    #[must_use]
    pub fn is_executable(&self) -> bool {
        match &self.0.implementation {
            Implementation::Native(_) => true,
            Implementation::Declared => false,
            Implementation::Wrapper(wrapper) => wrapper.source().is_executable(),
        }
    }

    /// Deprecation metadata of a wrapper
    #[must_use]
    pub fn deprecation(&self) -> Option<&WrapperMetadata> {
        match &self.0.implementation {
            Implementation::Wrapper(wrapper) => Some(wrapper.metadata()),
            _ => None,
        }
    }

    /// The callable a wrapper was built around
    #[must_use]
    pub fn wrapped(&self) -> Option<&Callable> {
        match &self.0.implementation {
            Implementation::Wrapper(wrapper) => Some(wrapper.source()),
            _ => None,
        }
    }

    /// Warning counters of a wrapper
    #[must_use]
    pub fn throttle(&self) -> Option<&Throttle> {
        match &self.0.implementation {
            Implementation::Wrapper(wrapper) => Some(wrapper.throttle()),
            _ => None,
        }
    }

    /// This callable followed by every layer it wraps, outermost first
    pub fn layers(&self) -> impl Iterator<Item = &Callable> {
        std::iter::successors(Some(self), |c| c.wrapped())
    }

    /// Innermost non-wrapper callable
    #[must_use]
    pub fn innermost(&self) -> &Callable {
        self.layers().last().unwrap_or(self)
    }

    /// Call with positional and keyword arguments
    ///
    /// # Errors
    /// - [`CallError::Binding`] if the arguments do not fit the signature
    /// - [`CallError::NotExecutable`] for declared callables
    /// - anything raised by the body or a deprecation wrapper
    pub fn call(&self, args: &Arguments) -> Result<Value, CallError> {
        match &self.0.implementation {
            Implementation::Native(body) => {
                let bound = self
                    .0
                    .signature
                    .bind(args)
                    .map_err(|source| CallError::Binding {
                        callable: self.qualified_path(),
                        source,
                    })?;
                body(&bound)
            }
            Implementation::Declared => Err(CallError::NotExecutable(self.qualified_path())),
            Implementation::Wrapper(wrapper) => wrapper.call(self, args),
        }
    }

    /// Call with keyword arguments only
    ///
    /// # Errors
    /// Same as [`Callable::call`]
    pub fn call_keywords(&self, kwargs: Kwargs) -> Result<Value, CallError> {
        self.call(&Arguments::from_keywords(kwargs))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let implementation = match &self.0.implementation {
            Implementation::Native(_) => "native",
            Implementation::Declared => "declared",
            Implementation::Wrapper(_) => "deprecated",
        };
        f.debug_struct("Callable")
            .field("path", &self.qualified_path())
            .field("kind", &self.0.kind)
            .field("implementation", &implementation)
            .finish_non_exhaustive()
    }
}

fn join_path(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{module}.{name}")
    }
}

/// Builder for [`Callable`]
#[derive(Debug, Clone)]
pub struct CallableBuilder {
    name: String,
    qualname: Option<String>,
    module: String,
    doc: Option<String>,
    signature: Signature,
    kind: CallableKind,
}

impl CallableBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualname: None,
            module: String::new(),
            doc: None,
            signature: Signature::empty(),
            kind: CallableKind::Function,
        }
    }

    /// Defining module
    #[must_use]
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Qualified name; defaults to the bare name
    #[must_use]
    pub fn qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = Some(qualname.into());
        self
    }

    /// Documentation
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Append a parameter
    #[must_use]
    pub fn param(mut self, param: Parameter) -> Self {
        let mut params = self.signature.params().to_vec();
        params.push(param);
        self.signature = Signature::new(params);
        self
    }

    /// Replace the whole parameter list
    #[must_use]
    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// Mark as initializer of `class`
    #[must_use]
    pub fn constructor_of(mut self, class: impl Into<String>) -> Self {
        self.kind = CallableKind::Constructor {
            class: class.into(),
        };
        self
    }

    /// Finish with a native body
    pub fn body<F>(self, body: F) -> Callable
    where
        F: Fn(&BoundArguments) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.finish(Implementation::Native(Arc::new(body)))
    }

    /// Finish without a body; calling it yields [`CallError::NotExecutable`]
    #[must_use]
    pub fn declared(self) -> Callable {
        self.finish(Implementation::Declared)
    }

    fn finish(self, implementation: Implementation) -> Callable {
        let qualname = self.qualname.unwrap_or_else(|| self.name.clone());
        Callable(Arc::new(CallableInner {
            name: self.name,
            qualname,
            module: self.module,
            doc: self.doc,
            signature: self.signature,
            kind: self.kind,
            implementation,
        }))
    }
}

struct ClassInner {
    name: String,
    module: String,
    doc: Option<String>,
    constructor: Callable,
    methods: IndexMap<String, Callable>,
}

/// Shared class handle
///
/// Only the constructor and registered methods are modelled; instances are
/// whatever value the constructor returns.
#[derive(Clone)]
pub struct Class(Arc<ClassInner>);

impl Class {
    /// Start building a class
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    /// Class name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Defining module
    #[inline]
    #[must_use]
    pub fn module(&self) -> &str {
        &self.0.module
    }

    /// Documentation
    #[inline]
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.0.doc.as_deref()
    }

    /// `module.name`
    #[must_use]
    pub fn path(&self) -> String {
        join_path(&self.0.module, &self.0.name)
    }

    /// Initializer (`__init__`)
    #[inline]
    #[must_use]
    pub fn constructor(&self) -> &Callable {
        &self.0.constructor
    }

    /// Method by name
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Callable> {
        self.0.methods.get(name)
    }

    /// Methods in registration order
    pub fn methods(&self) -> impl Iterator<Item = (&str, &Callable)> {
        self.0.methods.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check if both handles refer to the same class
    #[inline]
    #[must_use]
    pub fn same_as(&self, other: &Class) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Run the constructor
    ///
    /// # Errors
    /// Whatever the constructor raises
    pub fn instantiate(&self, args: &Arguments) -> Result<Value, CallError> {
        self.0.constructor.call(args)
    }

    /// Copy of this class with another constructor and documentation
    #[must_use]
    pub fn with_constructor(&self, constructor: Callable, doc: Option<String>) -> Class {
        Class(Arc::new(ClassInner {
            name: self.0.name.clone(),
            module: self.0.module.clone(),
            doc,
            constructor,
            methods: self.0.methods.clone(),
        }))
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("path", &self.path())
            .field("methods", &self.0.methods.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Class`]
pub struct ClassBuilder {
    name: String,
    module: String,
    doc: Option<String>,
    constructor: Option<Callable>,
    methods: IndexMap<String, Callable>,
}

impl ClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: String::new(),
            doc: None,
            constructor: None,
            methods: IndexMap::new(),
        }
    }

    /// Defining module
    #[must_use]
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Documentation
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    fn constructor_builder(&self, signature: Signature) -> CallableBuilder {
        Callable::builder("__init__")
            .module(self.module.clone())
            .qualname(format!("{}.__init__", self.name))
            .signature(signature)
            .constructor_of(self.name.clone())
    }

    /// Initializer with a native body returning the new instance
    #[must_use]
    pub fn init<F>(mut self, signature: Signature, body: F) -> Self
    where
        F: Fn(&BoundArguments) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.constructor = Some(self.constructor_builder(signature).body(body));
        self
    }

    /// Initializer without body
    #[must_use]
    pub fn init_declared(mut self, signature: Signature) -> Self {
        self.constructor = Some(self.constructor_builder(signature).declared());
        self
    }

    /// Register a method
    ///
    /// The method keeps the module and qualified name it was built with.
    #[must_use]
    pub fn method(mut self, method: Callable) -> Self {
        self.methods.insert(method.name().to_string(), method);
        self
    }

    /// Finish; without an explicit initializer the class takes no arguments
    /// and instantiates to an empty object
    #[must_use]
    pub fn build(self) -> Class {
        let constructor = match self.constructor {
            Some(constructor) => constructor,
            None => self
                .constructor_builder(Signature::empty())
                .body(|_| Ok(Value::Object(serde_json::Map::new()))),
        };
        Class(Arc::new(ClassInner {
            name: self.name,
            module: self.module,
            doc: self.doc,
            constructor,
            methods: self.methods,
        }))
    }
}
