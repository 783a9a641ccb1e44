//! winstate CLI
//!
//! Verify a Windows host against a declared profile, capture its
//! configuration back into a portable export, and discover what is installed.

mod cli;
mod commands;
mod error;
mod logging;
mod session;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;
use session::Session;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let session = Session::from_cli(&cli)?;

    match cli.command {
        Some(cmd) => execute_command(&session, cmd),
        None => {
            println!("{} Declarative Windows host state", "winstate".green().bold());
            println!();
            println!("Run {} for available commands.", "winstate --help".cyan());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn execute_command(session: &Session, cmd: Commands) -> Result<ExitCode> {
    match cmd {
        Commands::Verify { target, json } => commands::run_verify(session, &target, json),
        Commands::Export {
            target,
            out,
            dry_run,
            json,
        } => commands::run_export(session, &target, out, dry_run, json),
        Commands::Discover { json, template } => commands::run_discover(session, json, template),
        Commands::Profile { action } => {
            session.init_logging()?;
            commands::run_profile(session, action)
        }
        Commands::State { action } => {
            session.init_logging()?;
            commands::run_state(session, action)
        }
    }
}
