//! Removal deadline enforcement

use crate::error::AuditError;
use crate::namespace::Module;
use crate::scanner::find_deprecated_callables;
use crate::validate::DeprecatedCallableInfo;
use crate::version::{is_expired, parse_version};

/// Report every wrapper whose removal version has been reached
///
/// Without `current_version` the module's declared version is used.
/// Wrappers without `remove_in` never expire, nor do wrappers whose
/// `remove_in` does not parse.
///
/// # Errors
/// - [`AuditError::VersionUnavailable`] if no version is given or declared
/// - [`AuditError::InvalidVersion`] if the current version does not parse
pub fn validate_deprecation_expiry(
    module: &Module,
    current_version: Option<&str>,
    recursive: bool,
) -> Result<Vec<String>, AuditError> {
    let current = match current_version {
        Some(version) => version,
        None => module
            .version()
            .ok_or_else(|| AuditError::VersionUnavailable(module.package().to_string()))?,
    };
    expired_in(&find_deprecated_callables(module, recursive), current)
}

/// Expiry findings among already scanned wrappers
///
/// # Errors
/// [`AuditError::InvalidVersion`] if `current_version` does not parse
pub fn expired_in(found: &[DeprecatedCallableInfo], current_version: &str) -> Result<Vec<String>, AuditError> {
    let current = parse_version(current_version)?;
    Ok(found
        .iter()
        .filter_map(|info| {
            let remove_in = info.remove_in().filter(|v| !v.is_empty())?;
            is_expired(&current, remove_in).then(|| expiry_message(&info.function, remove_in, current_version))
        })
        .collect())
}

fn expiry_message(function: &str, remove_in: &str, current: &str) -> String {
    format!(
        "Callable `{function}` was scheduled for removal in version {remove_in} \
         but still exists in version {current}. Please delete this deprecated code."
    )
}
