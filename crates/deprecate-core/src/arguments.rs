//! Call arguments and bound argument views

use crate::error::CallError;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Keyword arguments in call order
pub type Kwargs = IndexMap<String, Value>;

/// Arguments of a single call: positionals followed by keywords
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    keyword: Kwargs,
}

impl Arguments {
    /// Empty argument list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments given purely by keyword
    #[inline]
    #[must_use]
    pub fn from_keywords(keyword: Kwargs) -> Self {
        Self {
            positional: Vec::new(),
            keyword,
        }
    }

    /// Append a positional argument
    #[inline]
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument
    #[inline]
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Positional arguments
    #[inline]
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments
    #[inline]
    #[must_use]
    pub fn keyword(&self) -> &Kwargs {
        &self.keyword
    }

    /// Total number of arguments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    /// Check if no arguments were given
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// Arguments bound to a signature, defaults filled, in declaration order
///
/// This is what a callable body observes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    values: Kwargs,
}

impl BoundArguments {
    pub(crate) fn new(values: Kwargs) -> Self {
        Self { values }
    }

    /// Raw value of a parameter
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Deserialize a parameter into a concrete type
    ///
    /// # Errors
    /// - [`CallError::Failed`] if nothing is bound to `name`
    /// - [`CallError::InvalidValue`] if the value has the wrong shape
    pub fn extract<T: DeserializeOwned>(&self, name: &str) -> Result<T, CallError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| CallError::failed(format!("no argument bound to `{name}`")))?;
        serde_json::from_value(value.clone()).map_err(|source| CallError::InvalidValue {
            name: name.to_string(),
            source,
        })
    }

    /// Bound parameter names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bound parameters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is bound
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume into the underlying map
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Kwargs {
        self.values
    }
}
