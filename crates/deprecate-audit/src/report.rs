//! Audit report
//!
//! Runs the scanner and the expiry and chain validators over one module
//! and groups what they found by severity.

use crate::chains::chains_in;
use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::expiry::expired_in;
use crate::namespace::Module;
use crate::registry::{package_of, ModuleRegistry};
use crate::scanner::find_deprecated_callables;
use crate::validate::DeprecatedCallableInfo;
use serde::Serialize;
use std::fmt;

/// Everything an audit found in one module
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Audited module path
    pub module: String,
    /// Version removal deadlines were checked against, if any
    pub current_version: Option<String>,
    /// Every deprecation wrapper found
    pub callables: Vec<DeprecatedCallableInfo>,
    /// Expired removal deadlines
    pub expired: Vec<String>,
    /// Wrappers that are part of a deprecation chain
    pub chains: Vec<DeprecatedCallableInfo>,
    /// Whether no-effect wrappers count as errors
    #[serde(skip)]
    fail_on_no_effect: bool,
}

impl AuditReport {
    /// Audit `module`
    ///
    /// Removal deadlines are only checked when a current version is
    /// configured or declared by the module.
    ///
    /// # Errors
    /// Version and chain errors of the individual validators
    pub fn run(module: &Module, config: &AuditConfig) -> Result<Self, AuditError> {
        let current = config
            .current_version
            .clone()
            .or_else(|| module.version().map(str::to_string));
        Self::build(module, current, config)
    }

    /// Audit the module at `path` of `registry`
    ///
    /// The current version falls back to the registry's knowledge of the
    /// top-level package.
    ///
    /// # Errors
    /// [`AuditError::Import`] for an unknown path, otherwise as
    /// [`AuditReport::run`]
    pub fn run_path(registry: &ModuleRegistry, path: &str, config: &AuditConfig) -> Result<Self, AuditError> {
        let module = registry.import(path)?;
        let current = match &config.current_version {
            Some(version) => Some(version.clone()),
            None => registry.version_of(package_of(path)).ok(),
        };
        Self::build(&module, current, config)
    }

    fn build(module: &Module, current: Option<String>, config: &AuditConfig) -> Result<Self, AuditError> {
        let callables = find_deprecated_callables(module, config.recursive);
        let expired = match &current {
            Some(version) => expired_in(&callables, version)?,
            None => {
                tracing::warn!(module = %module.name(), "no current version known, skipping expiry check");
                Vec::new()
            }
        };
        let chains = chains_in(callables.iter().cloned(), config.max_chain_depth)?;

        tracing::info!(
            module = %module.name(),
            callables = callables.len(),
            expired = expired.len(),
            chains = chains.len(),
            "audit finished"
        );
        Ok(Self {
            module: module.name().to_string(),
            current_version: current,
            callables,
            expired,
            chains,
            fail_on_no_effect: config.fail_on_no_effect,
        })
    }

    /// Wrappers with argument mappings that name no parameter
    pub fn invalid_args(&self) -> impl Iterator<Item = &DeprecatedCallableInfo> {
        self.callables.iter().filter(|info| !info.invalid_args.is_empty())
    }

    /// Wrappers with identity mappings
    pub fn identity_mappings(&self) -> impl Iterator<Item = &DeprecatedCallableInfo> {
        self.callables.iter().filter(|info| !info.identity_mapping.is_empty())
    }

    /// Wrappers that change nothing about a call
    pub fn no_effect(&self) -> impl Iterator<Item = &DeprecatedCallableInfo> {
        self.callables.iter().filter(|info| info.no_effect)
    }

    /// Check for findings that should fail a run
    ///
    /// Invalid mappings and expired deadlines always count; no-effect
    /// wrappers only when configured.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.invalid_args().next().is_some()
            || !self.expired.is_empty()
            || (self.fail_on_no_effect && self.no_effect().next().is_some())
    }

    /// Check for any finding at all
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.has_errors()
            || self.identity_mappings().next().is_some()
            || self.no_effect().next().is_some()
            || !self.chains.is_empty()
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scanned `{}`: {} deprecated callables", self.module, self.callables.len())?;
        if self.callables.is_empty() {
            return writeln!(f, "No deprecated callables found.");
        }

        section(f, "ERROR", "Found functions with invalid argument mappings:", self.invalid_args(), |f, info| {
            writeln!(f, "  - {}: {:?}", info.path(), info.invalid_args)
        })?;
        section(
            f,
            "WARNING",
            "Found functions with identity argument mappings (arg -> arg):",
            self.identity_mappings(),
            |f, info| writeln!(f, "  - {}: {:?}", info.path(), info.identity_mapping),
        )?;
        section(
            f,
            if self.fail_on_no_effect { "ERROR" } else { "WARNING" },
            "Found deprecated wrappers with NO EFFECT (zero impact):",
            self.no_effect(),
            |f, info| {
                writeln!(f, "  - {}", info.path())?;
                if info.empty_mapping {
                    writeln!(f, "    Reason: Empty mapping")?;
                }
                if info.self_reference {
                    writeln!(f, "    Reason: Self reference")?;
                }
                if info.all_identity() {
                    writeln!(f, "    Reason: All identity mappings")?;
                }
                Ok(())
            },
        )?;
        section(f, "ERROR", "Found callables past their scheduled removal:", self.expired.iter(), |f, line| {
            writeln!(f, "  - {line}")
        })?;
        section(f, "WARNING", "Found deprecation chains:", self.chains.iter(), |f, info| {
            let kind = info.chain_type.map(|kind| kind.to_string()).unwrap_or_default();
            writeln!(f, "  - {}: {} chain, {} hop(s)", info.path(), kind, info.chain_hops)
        })?;

        if self.has_issues() {
            writeln!(f, "\nIssues were found in deprecated wrappers.")
        } else {
            writeln!(f, "\nAll deprecated wrappers look correct!")
        }
    }
}

fn section<'a, T: 'a>(
    f: &mut fmt::Formatter<'_>,
    level: &str,
    title: &str,
    items: impl Iterator<Item = &'a T>,
    mut line: impl FnMut(&mut fmt::Formatter<'_>, &'a T) -> fmt::Result,
) -> fmt::Result {
    let mut items = items.peekable();
    if items.peek().is_none() {
        return Ok(());
    }
    writeln!(f, "\n[{level}] {title}")?;
    items.try_for_each(|item| line(f, item))
}
