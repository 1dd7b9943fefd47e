//! `deprecate` binary
//!
//! Exit codes: 0 when the run passed, 1 when the audit found errors, 2 when
//! the run itself failed.

use clap::Parser;
use deprecate_cli::{init_tracing, run, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(&cli.command, &mut std::io::stdout().lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
