//! `winstate export`

use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use winstate_core::export::ExportResult;
use winstate_core::{
    Envelope, ExportEngine, ExportOptions, ExportReport, ExportStatus, ResolvedManifest, RunContext,
    SensitivePathPolicy,
};

use super::{exit_code, print_failure, print_json, print_run_files, with_run_files};
use crate::error::Result;
use crate::session::Session;

const COMMAND: &str = "export";

/// Run the export command
pub fn run_export(
    session: &Session,
    target: &str,
    out: Option<PathBuf>,
    dry_run: bool,
    json: bool,
) -> Result<ExitCode> {
    let mut ctx = session.start_run(COMMAND)?;

    let report = match export(session, &mut ctx, target, out, dry_run) {
        Ok(report) => report,
        Err(e) if json => return print_failure(COMMAND, &ctx, &e),
        Err(e) => return Err(e),
    };

    if json {
        let mut envelope = Envelope::new(COMMAND, &ctx.run_id, report.results.clone());
        envelope.success = report.success();
        envelope.manifest = Some(report.manifest.clone());
        envelope.summary = report.summary.counters();
        print_json(&with_run_files(envelope, &ctx, Some(report.state_file.as_path())))?;
    } else {
        print_report(&ctx, &report);
    }

    Ok(exit_code(report.success()))
}

fn export(
    session: &Session,
    ctx: &mut RunContext,
    target: &str,
    out: Option<PathBuf>,
    dry_run: bool,
) -> Result<ExportReport> {
    let manifest: ResolvedManifest = session.resolve_manifest(target)?;
    let options = ExportOptions {
        export_root: out.unwrap_or_else(|| ExportOptions::default_root(&manifest)),
        dry_run,
    };
    let policy = SensitivePathPolicy::with_extra(&session.settings.sensitive_patterns)?;
    Ok(ExportEngine::new(policy).run(ctx, &manifest, &options)?)
}

fn print_report(ctx: &RunContext, report: &ExportReport) {
    let verb = if report.dry_run { "Planning export of" } else { "Exporting" };
    println!(
        "{} {} {} {}",
        verb.green().bold(),
        report.manifest.name.cyan(),
        "->".dimmed(),
        report.export_root.display()
    );
    println!();

    for result in &report.results {
        print_result(result);
    }

    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }

    let summary = &report.summary;
    println!();
    println!(
        "{} {} exported, {} skipped, {} failed, {} with warnings",
        "Summary:".bold(),
        summary.exported.to_string().green(),
        summary.skipped.to_string().yellow(),
        summary.failed.to_string().red(),
        summary.warned
    );
    if let Some(snapshot) = &report.snapshot {
        println!("  {} {}", "snapshot:".dimmed(), snapshot.display());
    }
    if report.dry_run {
        println!("{} nothing was written", "dry-run:".cyan());
    }

    print_run_files(ctx, &report.state_file);
}

fn print_result(result: &ExportResult) {
    let marker = match result.status {
        ExportStatus::Success => "copy".green(),
        ExportStatus::DryRun => "plan".cyan(),
        ExportStatus::Skipped => "skip".yellow(),
        ExportStatus::Failed => "FAIL".red().bold(),
    };
    let detail = result
        .message
        .as_deref()
        .or(result.reason.as_deref())
        .unwrap_or_default();
    println!("  {} {:<32} {}", marker, result.source, detail.dimmed());
    for warning in &result.warnings {
        println!("       {} {}", "sensitive:".yellow(), warning);
    }
}
