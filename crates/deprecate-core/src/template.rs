//! Warning message templates and docstring notices

use crate::error::ConfigurationError;
use crate::reconcile::ArgMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default message for a wrapper forwarding to a callable
pub const TEMPLATE_WARNING_CALLABLE: &str = "The `{source_name}` was deprecated since v{deprecated_in} in favor of `{target_path}`. It will be removed in v{remove_in}.";

/// Default message for a wrapper without target
pub const TEMPLATE_WARNING_NO_TARGET: &str =
    "The `{source_name}` was deprecated since v{deprecated_in}. It will be removed in v{remove_in}.";

/// Default message for deprecated arguments
pub const TEMPLATE_WARNING_ARGUMENTS: &str = "The `{source_name}` uses deprecated arguments: {argument_map}. They were deprecated since v{deprecated_in} and will be removed in v{remove_in}.";

/// Placeholders a template may reference
pub const PLACEHOLDERS: [&str; 7] = [
    "source_name",
    "source_path",
    "target_name",
    "target_path",
    "deprecated_in",
    "remove_in",
    "argument_map",
];

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is a valid regex")
});

/// Values substituted into a template
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageContext<'a> {
    /// Display name of the deprecated callable
    pub source_name: &'a str,
    /// `module.source_name`
    pub source_path: &'a str,
    /// Display name of the target, empty without one
    pub target_name: &'a str,
    /// `module.target_name`, empty without target
    pub target_path: &'a str,
    /// Version the deprecation started in
    pub deprecated_in: &'a str,
    /// Version the callable goes away in
    pub remove_in: &'a str,
    /// Rendered argument map
    pub argument_map: &'a str,
}

impl MessageContext<'_> {
    fn lookup(&self, placeholder: &str) -> Option<&str> {
        Some(match placeholder {
            "source_name" => self.source_name,
            "source_path" => self.source_path,
            "target_name" => self.target_name,
            "target_path" => self.target_path,
            "deprecated_in" => self.deprecated_in,
            "remove_in" => self.remove_in,
            "argument_map" => self.argument_map,
            _ => return None,
        })
    }
}

/// Render a template
///
/// # Errors
/// [`ConfigurationError::UnknownPlaceholder`] for a placeholder outside of
/// [`PLACEHOLDERS`]
pub fn render(template: &str, ctx: &MessageContext<'_>) -> Result<String, ConfigurationError> {
    let mut out = String::with_capacity(template.len() + 64);
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = ctx
            .lookup(name.as_str())
            .ok_or_else(|| ConfigurationError::UnknownPlaceholder {
                placeholder: name.as_str().to_string(),
            })?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Placeholders referenced by a template that are not recognised
#[must_use]
pub fn unknown_placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !PLACEHOLDERS.contains(name))
        .map(str::to_string)
        .collect()
}

/// Render mapping entries as `` `old` -> `new` `` joined by `, `
pub fn argument_map<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a ArgMap)>,
{
    entries
        .into_iter()
        .map(|(old, new)| format!("`{old}` -> {new}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Append a `.. deprecated::` notice to documentation
///
/// Removal and replacement lines are left out when unknown.
#[must_use]
pub fn append_notice(
    doc: &str,
    deprecated_in: &str,
    remove_in: &str,
    target_path: Option<&str>,
) -> String {
    let mut out = String::from(doc.trim_end());
    out.push_str("\n\n.. deprecated:: ");
    out.push_str(deprecated_in);
    if !remove_in.is_empty() {
        out.push_str("\n   Will be removed in ");
        out.push_str(remove_in);
        out.push('.');
    }
    if let Some(path) = target_path.filter(|p| !p.is_empty()) {
        out.push_str("\n   Use `");
        out.push_str(path);
        out.push_str("` instead.");
    }
    out
}
