//! Signature reconciliation
//!
//! Translates the keyword view of a call made against the deprecated
//! callable into the keyword set handed to its replacement. Reconciliation
//! is pure: the same inputs always produce the same rebinding.

use crate::arguments::Kwargs;
use crate::error::{ArgumentMappingError, CallError, ConfigurationError};
use crate::signature::Signature;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fate of a deprecated argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ArgMap {
    /// Forward the value under a new name
    Rename(String),

    /// Consume the value without forwarding it
    Drop,
}

impl ArgMap {
    /// New name, if the argument is forwarded
    #[inline]
    #[must_use]
    pub fn renamed(&self) -> Option<&str> {
        match self {
            Self::Rename(name) => Some(name),
            Self::Drop => None,
        }
    }

    /// Check if the mapping keeps the original name
    #[inline]
    #[must_use]
    pub fn is_identity(&self, source: &str) -> bool {
        self.renamed() == Some(source)
    }
}

impl From<&str> for ArgMap {
    fn from(name: &str) -> Self {
        Self::Rename(name.to_string())
    }
}

impl From<String> for ArgMap {
    fn from(name: String) -> Self {
        Self::Rename(name)
    }
}

impl From<Option<String>> for ArgMap {
    fn from(name: Option<String>) -> Self {
        name.map_or(Self::Drop, Self::Rename)
    }
}

impl From<ArgMap> for Option<String> {
    fn from(value: ArgMap) -> Self {
        match value {
            ArgMap::Rename(name) => Some(name),
            ArgMap::Drop => None,
        }
    }
}

impl fmt::Display for ArgMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename(name) => write!(f, "`{name}`"),
            Self::Drop => f.write_str("dropped"),
        }
    }
}

/// Ordered source-argument mapping
pub type ArgsMapping = IndexMap<String, ArgMap>;

/// Applies an argument mapping and fixed extras to a call
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    mapping: &'a ArgsMapping,
    extra: &'a Kwargs,
}

impl<'a> Reconciler<'a> {
    /// Create reconciler over a mapping and extra arguments
    #[inline]
    #[must_use]
    pub fn new(mapping: &'a ArgsMapping, extra: &'a Kwargs) -> Self {
        Self { mapping, extra }
    }

    /// Mapped arguments present in a call, in mapping order
    #[must_use]
    pub fn used_arguments(&self, kwargs: &Kwargs) -> Vec<&'a str> {
        self.mapping
            .keys()
            .filter(|name| kwargs.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Rename and drop mapped arguments
    ///
    /// Unmapped arguments keep their name. When a renamed argument collides
    /// with one given under the new name, the later one in call order wins.
    #[must_use]
    pub fn rebind(&self, kwargs: Kwargs) -> Kwargs {
        let mut out = Kwargs::with_capacity(kwargs.len());
        for (name, value) in kwargs {
            match self.mapping.get(&name) {
                Some(ArgMap::Drop) => {}
                Some(ArgMap::Rename(new_name)) => {
                    out.insert(new_name.clone(), value);
                }
                None => {
                    out.insert(name, value);
                }
            }
        }
        out
    }

    /// Add the fixed extra arguments, overriding call values
    #[must_use]
    pub fn with_extra(&self, mut kwargs: Kwargs) -> Kwargs {
        for (name, value) in self.extra {
            kwargs.insert(name.clone(), value.clone());
        }
        kwargs
    }

    /// Rebind for a forwarding target and check the target accepts the result
    ///
    /// # Errors
    /// - [`ArgumentMappingError`] for arguments the target has no parameter for
    /// - [`ConfigurationError::MissingTargetArguments`] for required target
    ///   parameters left without a value
    pub fn forward(
        &self,
        kwargs: Kwargs,
        target: &Signature,
        source_name: &str,
        target_path: &str,
    ) -> Result<Kwargs, CallError> {
        let forwarded = self.with_extra(self.rebind(kwargs));

        let missing: Vec<String> = forwarded
            .keys()
            .filter(|name| !target.accepts_keyword(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ArgumentMappingError {
                source_name: source_name.to_string(),
                target: target_path.to_string(),
                missing,
            }
            .into());
        }

        let unfilled: Vec<String> = target
            .required_names()
            .filter(|name| !forwarded.contains_key(*name))
            .map(str::to_string)
            .collect();
        if !unfilled.is_empty() {
            return Err(ConfigurationError::MissingTargetArguments {
                source_name: source_name.to_string(),
                target: target_path.to_string(),
                missing: unfilled,
            }
            .into());
        }

        Ok(forwarded)
    }
}
