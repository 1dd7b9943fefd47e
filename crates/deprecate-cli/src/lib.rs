//! `deprecate` command line
//!
//! Loads a manifest into a module registry and audits it. Commands write
//! to the given output and report whether the run passed; exiting is left
//! to the binary.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use deprecate_audit::{AuditConfig, AuditReport, DeprecatedCallableInfo, Manifest, ModuleRegistry};
use deprecate_core::TargetSummary;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "deprecate", version, about = "Audit deprecation wrappers declared in a manifest")]
pub struct Cli {
    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check wrappers for no-op configurations, expired removals and chains
    Audit(AuditArgs),
    /// List every deprecated callable
    List(ListArgs),
}

/// Arguments of `deprecate audit`
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct AuditArgs {
    /// Manifest file, `.json` or `.toml`
    pub manifest: PathBuf,

    /// Module to audit; every top-level module when omitted
    #[arg(long)]
    pub module: Option<String>,

    /// Version to check removal deadlines against
    #[arg(long)]
    pub current_version: Option<String>,

    /// Do not descend into submodules
    #[arg(long)]
    pub no_recursive: bool,

    /// Report errors without failing
    #[arg(long)]
    pub skip_errors: bool,

    /// Treat wrappers without effect as errors
    #[arg(long)]
    pub fail_on_no_effect: bool,

    /// Longest deprecation chain to walk
    #[arg(long)]
    pub max_chain_depth: Option<usize>,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,

    /// Audit configuration file (TOML); flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl AuditArgs {
    /// Effective configuration: file values, then flags
    ///
    /// # Errors
    /// If the configuration file cannot be loaded or the result is invalid
    pub fn config(&self) -> Result<AuditConfig> {
        let mut config = match &self.config {
            Some(path) => AuditConfig::load(path)
                .with_context(|| format!("failed to load audit config {}", path.display()))?,
            None => AuditConfig::default(),
        };
        if let Some(version) = &self.current_version {
            config.current_version = Some(version.clone());
        }
        if let Some(depth) = self.max_chain_depth {
            config.max_chain_depth = depth;
        }
        config.recursive &= !self.no_recursive;
        config.skip_errors |= self.skip_errors;
        config.fail_on_no_effect |= self.fail_on_no_effect;
        config.validate()?;
        Ok(config)
    }
}

/// Arguments of `deprecate list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Manifest file, `.json` or `.toml`
    pub manifest: PathBuf,

    /// Module to list; every top-level module when omitted
    #[arg(long)]
    pub module: Option<String>,

    /// Do not descend into submodules
    #[arg(long)]
    pub no_recursive: bool,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Install the global `tracing` subscriber
///
/// Filtering follows `RUST_LOG` and defaults to `warn`. Logs go to stderr
/// so reports on stdout stay parseable.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Run a command, writing results to `out`
///
/// Returns whether the run passed.
///
/// # Errors
/// Unreadable manifests or configs, unknown modules, and audit failures
/// such as invalid versions or chain cycles
pub fn run(command: &Command, out: &mut impl Write) -> Result<bool> {
    match command {
        Command::Audit(args) => audit(args, out),
        Command::List(args) => list(args, out),
    }
}

fn audit(args: &AuditArgs, out: &mut impl Write) -> Result<bool> {
    let config = args.config()?;
    let registry = load_registry(&args.manifest)?;

    let mut reports = Vec::new();
    for module in selected_modules(&registry, args.module.as_deref()) {
        let report = AuditReport::run_path(&registry, &module, &config)
            .with_context(|| format!("failed to audit `{module}`"))?;
        reports.push(report);
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &reports)?;
        writeln!(out)?;
    } else {
        for (i, report) in reports.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            write!(out, "{report}")?;
        }
    }

    let failed = reports.iter().any(AuditReport::has_errors);
    if failed && config.skip_errors {
        tracing::info!("errors found but ignored");
    }
    Ok(!failed || config.skip_errors)
}

fn list(args: &ListArgs, out: &mut impl Write) -> Result<bool> {
    let registry = load_registry(&args.manifest)?;

    let mut found: Vec<DeprecatedCallableInfo> = Vec::new();
    for module in selected_modules(&registry, args.module.as_deref()) {
        let callables = registry
            .find_deprecated_callables(&module, !args.no_recursive)
            .with_context(|| format!("failed to scan `{module}`"))?;
        found.extend(callables);
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &found)?;
        writeln!(out)?;
        return Ok(true);
    }
    for info in &found {
        let removal = info.remove_in().map_or_else(String::new, |v| format!(", removed in {v}"));
        writeln!(out, "{}: {}{removal}", info.path(), describe_target(&info.metadata.target))?;
    }
    Ok(true)
}

fn describe_target(target: &TargetSummary) -> String {
    match target {
        TargetSummary::Absent => "warn only".to_string(),
        TargetSummary::SelfReference => "argument deprecation".to_string(),
        TargetSummary::Callable { path, .. } => format!("forwards to {path}"),
    }
}

fn load_registry(path: &Path) -> Result<ModuleRegistry> {
    let manifest = Manifest::load(path).with_context(|| format!("failed to read manifest {}", path.display()))?;
    manifest
        .into_registry()
        .with_context(|| format!("invalid manifest {}", path.display()))
}

fn selected_modules(registry: &ModuleRegistry, module: Option<&str>) -> Vec<String> {
    match module {
        Some(module) => vec![module.to_string()],
        None => {
            let names = registry.module_names();
            if names.is_empty() {
                tracing::warn!("manifest declares no modules");
            }
            names
        }
    }
}
