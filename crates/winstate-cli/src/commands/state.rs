//! `winstate state` subcommands

use std::process::ExitCode;

use colored::Colorize;
use winstate_core::state::StoredRun;

use super::print_json;
use crate::cli::StateAction;
use crate::error::{CliError, Result};
use crate::session::Session;

const LATEST: &str = "latest";

/// Run a state subcommand
pub fn run_state(session: &Session, action: StateAction) -> Result<ExitCode> {
    let store = session.state_store();
    match action {
        StateAction::List { command } => {
            let runs: Vec<StoredRun> = store
                .list()?
                .into_iter()
                .filter(|run| command.as_deref().is_none_or(|c| run.state.command == c))
                .collect();
            if runs.is_empty() {
                println!("No recorded runs in {}", store.dir().display().to_string().dimmed());
                return Ok(ExitCode::SUCCESS);
            }
            for run in &runs {
                let outcome = if run.state.success {
                    "ok".green()
                } else {
                    "failed".red()
                };
                println!(
                    "  {:<26} {:<9} {:<7} {}",
                    run.state.run_id,
                    run.state.command,
                    outcome,
                    run.state.timestamp.dimmed()
                );
            }
        }
        StateAction::Show { run_id, json } => {
            let run = if run_id == LATEST {
                store
                    .latest(None)?
                    .ok_or_else(|| CliError::user("No recorded runs yet"))?
            } else {
                store.find(&run_id)?
            };
            if json {
                print_json(&run.state)?;
            } else {
                print_run(&run);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_run(run: &StoredRun) {
    let state = &run.state;
    let outcome = if state.success {
        "succeeded".green().bold()
    } else {
        "failed".red().bold()
    };
    println!("{} {} {}", state.command.cyan(), state.run_id, outcome);
    println!("  {} {}", "at:".dimmed(), state.timestamp);
    if let Some(manifest) = &state.manifest {
        println!("  {} {} ({})", "manifest:".dimmed(), manifest.name, manifest.path);
    }
    let summary: Vec<String> = state
        .summary
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    println!("  {} {}", "summary:".dimmed(), summary.join(" "));
    for action in &state.actions {
        match &action.message {
            Some(message) => println!("    {:<8} {:<32} {:<9} {}", action.kind, action.id, action.status, message.dimmed()),
            None => println!("    {:<8} {:<32} {}", action.kind, action.id, action.status),
        }
    }
    if let Some(error) = &state.error {
        println!("  {} {}", "error:".red().bold(), error.message);
    }
    println!("  {} {}", "file:".dimmed(), run.path.display());
}
