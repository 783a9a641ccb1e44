//! `winstate verify`

use std::process::ExitCode;

use colored::Colorize;
use winstate_core::verify::{VerifyKind, VerifyResult};
use winstate_core::{
    Envelope, HostProbe, ResolvedManifest, RunContext, VerifyEngine, VerifyReport, VerifyStatus,
    WingetDriver,
};

use super::{exit_code, print_failure, print_json, print_run_files, with_run_files};
use crate::error::Result;
use crate::session::Session;

const COMMAND: &str = "verify";

/// Run the verify command
pub fn run_verify(session: &Session, target: &str, json: bool) -> Result<ExitCode> {
    let mut ctx = session.start_run(COMMAND)?;

    let outcome = verify(session, &mut ctx, target);
    let (manifest, report) = match outcome {
        Ok(done) => done,
        Err(e) if json => return print_failure(COMMAND, &ctx, &e),
        Err(e) => return Err(e),
    };

    if json {
        let mut envelope = Envelope::new(COMMAND, &ctx.run_id, report.results.clone());
        envelope.success = report.success();
        envelope.manifest = Some(report.manifest.clone());
        envelope.summary = report.summary.counters();
        envelope.error = report.error.clone();
        print_json(&with_run_files(envelope, &ctx, Some(report.state_file.as_path())))?;
    } else {
        print_report(&ctx, &manifest, &report);
    }

    Ok(exit_code(report.success()))
}

fn verify(session: &Session, ctx: &mut RunContext, target: &str) -> Result<(ResolvedManifest, VerifyReport)> {
    let manifest = session.resolve_manifest(target)?;
    let driver = WingetDriver::new();
    let report = VerifyEngine::new(&driver, &HostProbe).run(ctx, &manifest)?;
    Ok((manifest, report))
}

fn print_report(ctx: &RunContext, manifest: &ResolvedManifest, report: &VerifyReport) {
    println!(
        "{} {} {}",
        "Verifying".green().bold(),
        manifest.name.cyan(),
        format!("({})", manifest.chain.join(" -> ")).dimmed()
    );
    println!();

    for result in &report.results {
        print_result(result);
    }

    let summary = &report.summary;
    println!();
    println!(
        "{} {} passed, {} failed, {} skipped",
        "Summary:".bold(),
        summary.pass.to_string().green(),
        summary.fail.to_string().red(),
        summary.skip.to_string().yellow()
    );

    if let Some(error) = &report.error {
        println!("{} {}", "error:".red().bold(), error.message);
        if let Some(remediation) = &error.remediation {
            println!("{} {}", "hint:".cyan(), remediation);
        }
    } else {
        println!("{} Host matches {}", "OK".green().bold(), manifest.name);
    }

    print_run_files(ctx, &report.state_file);
}

fn print_result(result: &VerifyResult) {
    let marker = match result.status {
        VerifyStatus::Pass => "pass".green(),
        VerifyStatus::Fail => "FAIL".red().bold(),
        VerifyStatus::Skip => "skip".yellow(),
    };
    let label = match result.kind {
        VerifyKind::App => result.id.clone(),
        VerifyKind::Verify => format!("{} {}", result.driver.as_deref().unwrap_or("verify"), result.id),
    };
    match &result.message {
        Some(message) => println!("  {} {:<40} {}", marker, label, message.dimmed()),
        None => println!("  {} {}", marker, label),
    }
}
