//! `winstate discover`

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use winstate_core::{
    DiscoveryEngine, DiscoveryEntry, DiscoveryMethod, DiscoveryReport, Envelope, HostCommandProbe,
    RegQuerySource, RunContext, WingetDriver, render_template,
};
use winstate_fs::{NormalizedPath, io};

use super::{print_failure, print_json, print_run_files, with_run_files};
use crate::error::Result;
use crate::session::Session;

const COMMAND: &str = "discover";

/// Run the discover command
pub fn run_discover(session: &Session, json: bool, template: Option<PathBuf>) -> Result<ExitCode> {
    let mut ctx = session.start_run(COMMAND)?;

    let report = match discover(&mut ctx, template.as_deref()) {
        Ok(report) => report,
        Err(e) if json => return print_failure(COMMAND, &ctx, &e),
        Err(e) => return Err(e),
    };

    if json {
        let mut envelope = Envelope::new(COMMAND, &ctx.run_id, report.entries.clone());
        envelope.summary = report.summary.counters();
        print_json(&with_run_files(envelope, &ctx, Some(report.state_file.as_path())))?;
    } else {
        print_report(&ctx, &report, template.as_deref());
    }

    Ok(ExitCode::SUCCESS)
}

fn discover(ctx: &mut RunContext, template: Option<&Path>) -> Result<DiscoveryReport> {
    let commands = HostCommandProbe;
    let uninstall = RegQuerySource;
    let driver = WingetDriver::new();
    let report = DiscoveryEngine::new(&commands, &uninstall)
        .with_driver(&driver)
        .run(ctx)?;

    if let Some(path) = template {
        let content = render_template(&report.entries, &ctx.platform);
        io::write_atomic(&NormalizedPath::new(path), content.as_bytes())?;
        ctx.events.artifact("template", &path.display().to_string());
        tracing::info!(path = %path.display(), "Wrote manual-include template");
    }

    Ok(report)
}

fn print_report(ctx: &RunContext, report: &DiscoveryReport, template: Option<&Path>) {
    println!("{}", "Discovered software".green().bold());
    println!();

    for entry in &report.entries {
        print_entry(entry);
    }

    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }

    let summary = &report.summary;
    println!();
    println!(
        "{} {} found, {} managed by a driver, {} unmanaged",
        "Summary:".bold(),
        summary.total,
        summary.owned.to_string().green(),
        summary.unowned.to_string().yellow()
    );
    if let Some(path) = template {
        println!("  {} {}", "template:".dimmed(), path.display());
    } else if summary.unowned > 0 {
        println!(
            "{} Run {} to draft manifest entries",
            "hint:".cyan(),
            "winstate discover --template <path>".cyan()
        );
    }

    print_run_files(ctx, &report.state_file);
}

fn print_entry(entry: &DiscoveryEntry) {
    let owner = if entry.owned_by_driver {
        "managed".green()
    } else {
        "unmanaged".yellow()
    };
    let version = match entry.method {
        DiscoveryMethod::Path => entry.version.as_deref(),
        DiscoveryMethod::Registry => entry.display_version.as_deref(),
    }
    .unwrap_or_default();
    let id = entry.suggested_driver_id.as_deref().unwrap_or("-");
    println!(
        "  {:<12} {:<9} {:<10} {:<28} {}",
        entry.name,
        entry.method.as_str(),
        owner,
        id,
        version.dimmed()
    );
}
