//! Command implementations for winstate-cli

pub mod discover;
pub mod export;
pub mod profile;
pub mod state;
pub mod verify;

pub use discover::run_discover;
pub use export::run_export;
pub use profile::run_profile;
pub use state::run_state;
pub use verify::run_verify;

use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;
use serde::Serialize;
use winstate_core::{Envelope, RunContext};

use crate::error::{CliError, Result};

/// Fill the run bookkeeping fields every envelope carries
fn with_run_files<R: Serialize>(mut envelope: Envelope<R>, ctx: &RunContext, state_file: Option<&Path>) -> Envelope<R> {
    envelope.state_file = state_file.map(|p| p.display().to_string());
    envelope.log_file = ctx.log_file.as_ref().map(|p| p.display().to_string());
    envelope.events_file = ctx.events_file().map(|p| p.display().to_string());
    envelope
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `--json` rendering of an operation that never produced results
fn print_failure(command: &str, ctx: &RunContext, err: &CliError) -> Result<ExitCode> {
    let envelope = Envelope::failure(command, &ctx.run_id, err.to_error_object());
    print_json(&with_run_files(envelope, ctx, None))?;
    Ok(ExitCode::FAILURE)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Trailing state/log lines of human output
fn print_run_files(ctx: &RunContext, state_file: &Path) {
    println!();
    println!("  {} {}", "state:".dimmed(), state_file.display());
    if let Some(log) = &ctx.log_file {
        println!("  {} {}", "log:".dimmed(), log.display());
    }
    if let Some(events) = ctx.events_file() {
        println!("  {} {}", "events:".dimmed(), events.display());
    }
}
