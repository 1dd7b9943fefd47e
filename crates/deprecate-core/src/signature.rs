//! Callable signatures and argument binding
//!
//! A [`Signature`] is the ordered parameter list of a callable. It is the
//! only view of a callable the reconciler needs: parameter names, whether
//! they can be filled by keyword, their defaults, and whether they collect
//! surplus arguments.

use crate::arguments::{Arguments, BoundArguments, Kwargs};
use crate::error::BindingError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a parameter can be filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Filled by position or by keyword
    #[default]
    PositionalOrKeyword,

    /// Collects surplus positional arguments
    VarPositional,

    /// Filled by keyword only
    KeywordOnly,

    /// Collects surplus keyword arguments
    VarKeyword,
}

impl ParamKind {
    /// Can be filled positionally
    #[inline]
    #[must_use]
    pub fn is_positional(self) -> bool {
        matches!(self, Self::PositionalOrKeyword)
    }

    /// Collects surplus arguments
    #[inline]
    #[must_use]
    pub fn is_variadic(self) -> bool {
        matches!(self, Self::VarPositional | Self::VarKeyword)
    }
}

/// Single parameter descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    #[serde(default)]
    kind: ParamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
}

impl Parameter {
    /// Positional-or-keyword parameter without default
    #[inline]
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::PositionalOrKeyword,
            default: None,
        }
    }

    /// Positional-or-keyword parameter with default
    #[inline]
    #[must_use]
    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::PositionalOrKeyword,
            default: Some(default.into()),
        }
    }

    /// Keyword-only parameter, optionally defaulted
    #[inline]
    #[must_use]
    pub fn keyword_only(name: impl Into<String>, default: Option<Value>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::KeywordOnly,
            default,
        }
    }

    /// `*args`-style parameter
    #[inline]
    #[must_use]
    pub fn var_positional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::VarPositional,
            default: None,
        }
    }

    /// `**kwargs`-style parameter
    #[inline]
    #[must_use]
    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::VarKeyword,
            default: None,
        }
    }

    /// Parameter name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Default value, if any
    #[inline]
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Non-variadic parameter without default
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        !self.kind.is_variadic() && self.default.is_none()
    }
}

/// Ordered parameter list of a callable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature {
    params: Vec<Parameter>,
}

impl Signature {
    /// Create signature from parameters in declaration order
    #[must_use]
    pub fn new(params: impl IntoIterator<Item = Parameter>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    /// Signature without parameters
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// All parameters
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Number of parameters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if there are no parameters
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Lookup parameter by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Check if a parameter with this name is declared (of any kind)
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Parameter names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(Parameter::name)
    }

    /// The `*args`-style parameter
    #[must_use]
    pub fn var_positional(&self) -> Option<&Parameter> {
        self.params
            .iter()
            .find(|p| p.kind == ParamKind::VarPositional)
    }

    /// The `**kwargs`-style parameter
    #[must_use]
    pub fn var_keyword(&self) -> Option<&Parameter> {
        self.params.iter().find(|p| p.kind == ParamKind::VarKeyword)
    }

    /// Check if a keyword argument of this name would be accepted
    #[must_use]
    pub fn accepts_keyword(&self, name: &str) -> bool {
        match self.get(name) {
            Some(p) if p.kind != ParamKind::VarKeyword => true,
            _ => self.var_keyword().is_some(),
        }
    }

    /// Names of parameters that must be given a value
    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|p| p.is_required())
            .map(Parameter::name)
    }

    /// Default values of non-variadic parameters
    #[must_use]
    pub fn defaults(&self) -> Kwargs {
        self.params
            .iter()
            .filter(|p| !p.kind.is_variadic())
            .filter_map(|p| p.default.clone().map(|d| (p.name.clone(), d)))
            .collect()
    }

    /// Merge defaults under explicitly given arguments
    ///
    /// Explicit values take precedence; order is defaults first, then the
    /// remaining explicit arguments.
    #[must_use]
    pub fn with_defaults(&self, explicit: Kwargs) -> Kwargs {
        let mut merged = self.defaults();
        for (name, value) in explicit {
            merged.insert(name, value);
        }
        merged
    }

    /// Convert a call's positional arguments to keywords
    ///
    /// Defaults are not filled in. Surplus positionals are collected under
    /// the `*args` parameter when one exists.
    ///
    /// # Errors
    /// - [`BindingError::TooManyPositional`] without a `*args` parameter
    /// - [`BindingError::MultipleValues`] if a keyword repeats a positional
    pub fn keywords_of(&self, args: &Arguments) -> Result<Kwargs, BindingError> {
        let positional: Vec<&Parameter> = self
            .params
            .iter()
            .filter(|p| p.kind.is_positional())
            .collect();
        let given = args.positional().len();

        let mut out = Kwargs::with_capacity(given + args.keyword().len());
        for (param, value) in positional.iter().zip(args.positional()) {
            out.insert(param.name.clone(), value.clone());
        }

        if given > positional.len() {
            let Some(var) = self.var_positional() else {
                return Err(BindingError::TooManyPositional {
                    expected: positional.len(),
                    given,
                });
            };
            let surplus = args.positional()[positional.len()..].to_vec();
            out.insert(var.name.clone(), Value::Array(surplus));
        }

        for (name, value) in args.keyword() {
            if out.contains_key(name) {
                return Err(BindingError::MultipleValues(name.clone()));
            }
            out.insert(name.clone(), value.clone());
        }

        Ok(out)
    }

    /// Bind a call to this signature, filling defaults
    ///
    /// # Errors
    /// Any [`BindingError`] describing the mismatch
    pub fn bind(&self, args: &Arguments) -> Result<BoundArguments, BindingError> {
        let kwargs = self.keywords_of(args)?;
        self.bind_keywords(kwargs)
    }

    /// Bind keyword arguments to this signature, filling defaults
    ///
    /// The result follows declaration order. Unknown names are collected
    /// under the `**kwargs` parameter when one exists.
    ///
    /// # Errors
    /// - [`BindingError::UnexpectedKeyword`] for an unknown name
    /// - [`BindingError::MissingArguments`] for unfilled required parameters
    pub fn bind_keywords(&self, kwargs: Kwargs) -> Result<BoundArguments, BindingError> {
        let var_keyword = self.var_keyword().map(Parameter::name);
        let mut given = Kwargs::with_capacity(kwargs.len());
        let mut surplus = serde_json::Map::new();

        for (name, value) in kwargs {
            match self.get(&name) {
                Some(p) if p.kind != ParamKind::VarKeyword => {
                    given.insert(name, value);
                }
                _ if var_keyword.is_some() => {
                    surplus.insert(name, value);
                }
                _ => return Err(BindingError::UnexpectedKeyword(name)),
            }
        }

        let mut bound = Kwargs::with_capacity(self.params.len());
        let mut missing = Vec::new();
        for param in &self.params {
            let value = match param.kind {
                ParamKind::VarKeyword => Some(Value::Object(std::mem::take(&mut surplus))),
                ParamKind::VarPositional => Some(
                    given
                        .shift_remove(&param.name)
                        .unwrap_or_else(|| Value::Array(Vec::new())),
                ),
                _ => given
                    .shift_remove(&param.name)
                    .or_else(|| param.default.clone()),
            };
            match value {
                Some(v) => {
                    bound.insert(param.name.clone(), v);
                }
                None => missing.push(param.name.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(BindingError::MissingArguments(missing));
        }
        Ok(BoundArguments::new(bound))
    }
}

impl FromIterator<Parameter> for Signature {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sum_signature() -> Signature {
        Signature::new([Parameter::required("a"), Parameter::optional("b", 5)])
    }

    #[test]
    fn keywords_of_maps_positionals_by_name() {
        let sig = Signature::new([
            Parameter::required("a"),
            Parameter::required("b"),
            Parameter::optional("c", 3),
        ]);
        let args = Arguments::new().arg(1).arg("hello");

        let kwargs = sig.keywords_of(&args).unwrap();
        assert_eq!(kwargs.get("a"), Some(&json!(1)));
        assert_eq!(kwargs.get("b"), Some(&json!("hello")));
        assert!(!kwargs.contains_key("c"));
    }

    #[test]
    fn keywords_of_keeps_explicit_keywords() {
        let sig = Signature::new([
            Parameter::required("a"),
            Parameter::required("b"),
            Parameter::optional("c", 0),
        ]);
        let args = Arguments::new().arg(10).kwarg("c", 99);

        let kwargs = sig.keywords_of(&args).unwrap();
        assert_eq!(kwargs.len(), 2);
        assert_eq!(kwargs["c"], json!(99));
    }

    #[test]
    fn keywords_of_rejects_surplus_positionals() {
        let sig = Signature::new([Parameter::required("a"), Parameter::required("b")]);
        let err = sig
            .keywords_of(&Arguments::new().arg(1).arg(2).arg(3))
            .unwrap_err();
        assert_eq!(
            err,
            BindingError::TooManyPositional {
                expected: 2,
                given: 3
            }
        );
        assert!(err.to_string().contains("takes 2 positional"));
    }

    #[test]
    fn keywords_of_collects_surplus_into_var_positional() {
        let sig = Signature::new([Parameter::required("a"), Parameter::var_positional("rest")]);
        let kwargs = sig
            .keywords_of(&Arguments::new().arg(1).arg(2).arg(3))
            .unwrap();
        assert_eq!(kwargs["a"], json!(1));
        assert_eq!(kwargs["rest"], json!([2, 3]));
    }

    #[test]
    fn keywords_of_rejects_duplicate_values() {
        let err = sum_signature()
            .keywords_of(&Arguments::new().arg(1).kwarg("a", 2))
            .unwrap_err();
        assert_eq!(err, BindingError::MultipleValues("a".into()));
    }

    #[test]
    fn bind_fills_defaults_in_declaration_order() {
        let bound = sum_signature()
            .bind(&Arguments::new().kwarg("a", 2))
            .unwrap();
        let names: Vec<&str> = bound.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(bound.get("b"), Some(&json!(5)));
    }

    #[test]
    fn bind_reports_every_missing_argument() {
        let sig = Signature::new([Parameter::required("a"), Parameter::required("b")]);
        let err = sig.bind(&Arguments::new()).unwrap_err();
        assert_eq!(err, BindingError::MissingArguments(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn bind_rejects_unknown_keyword_without_catch_all() {
        let err = sum_signature()
            .bind(&Arguments::new().arg(1).kwarg("zzz", 0))
            .unwrap_err();
        assert_eq!(err, BindingError::UnexpectedKeyword("zzz".into()));
    }

    #[test]
    fn bind_collects_unknown_keywords_into_var_keyword() {
        let sig = Signature::new([Parameter::required("c"), Parameter::var_keyword("kwargs")]);
        let bound = sig
            .bind(&Arguments::new().arg(2).kwarg("e", 0.1))
            .unwrap();
        assert_eq!(bound.get("kwargs"), Some(&json!({"e": 0.1})));
    }

    #[test]
    fn accepts_keyword_respects_catch_all() {
        let plain = sum_signature();
        assert!(plain.accepts_keyword("a"));
        assert!(!plain.accepts_keyword("c"));

        let open = Signature::new([Parameter::required("a"), Parameter::var_keyword("kw")]);
        assert!(open.accepts_keyword("anything"));
    }

    #[test]
    fn defaults_skip_required_parameters() {
        let sig = Signature::new([
            Parameter::required("required"),
            Parameter::optional("optional", 5),
        ]);
        let defaults = sig.defaults();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults["optional"], json!(5));
    }

    #[test]
    fn with_defaults_prefers_explicit_values() {
        let sig = Signature::new([
            Parameter::optional("a", 1),
            Parameter::optional("b", 2),
            Parameter::optional("c", 3),
        ]);
        let mut explicit = Kwargs::new();
        explicit.insert("b".into(), json!(20));

        let merged = sig.with_defaults(explicit);
        assert_eq!(merged["a"], json!(1));
        assert_eq!(merged["b"], json!(20));
        assert_eq!(merged["c"], json!(3));
    }

    #[test]
    fn signature_deserializes_from_parameter_list() {
        let sig: Signature = serde_json::from_value(json!([
            {"name": "a"},
            {"name": "b", "default": 5},
            {"name": "kw", "kind": "var_keyword"}
        ]))
        .unwrap();
        assert_eq!(sig.len(), 3);
        assert!(sig.get("a").unwrap().is_required());
        assert_eq!(sig.get("kw").unwrap().kind(), ParamKind::VarKeyword);
    }
}
