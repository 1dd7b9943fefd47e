//! PEP 440 version comparison

use crate::error::AuditError;
use pep440_rs::Version;
use std::str::FromStr;

/// Parse a version string
///
/// # Errors
/// [`AuditError::InvalidVersion`] if `version` is not PEP 440
pub fn parse_version(version: &str) -> Result<Version, AuditError> {
    Version::from_str(version.trim()).map_err(|err| AuditError::InvalidVersion {
        version: version.to_string(),
        reason: err.to_string(),
    })
}

/// Check if `current` has reached the removal version `remove_in`
///
/// An unparsable `remove_in` never expires.
#[must_use]
pub fn is_expired(current: &Version, remove_in: &str) -> bool {
    match parse_version(remove_in) {
        Ok(remove) => *current >= remove,
        Err(err) => {
            tracing::warn!(remove_in, error = %err, "skipping unparsable removal version");
            false
        }
    }
}
