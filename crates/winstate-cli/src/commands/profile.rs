//! `winstate profile` subcommands

use std::process::ExitCode;

use colored::Colorize;
use winstate_core::ProfileStore;

use super::print_json;
use crate::cli::ProfileAction;
use crate::error::Result;
use crate::session::Session;

/// Run a profile subcommand
pub fn run_profile(session: &Session, action: ProfileAction) -> Result<ExitCode> {
    let store = session.profile_store();
    match action {
        ProfileAction::List => run_list(&store)?,
        ProfileAction::Show { name, json } => run_show(session, &name, json)?,
        ProfileAction::New { name, include } => run_new(&store, &name, &include)?,
        ProfileAction::AddApp { name, ids } => {
            let added = store.add_app(&name, &session.settings.platform, &ids)?;
            report_change(&name, added, ids.len(), "app");
        }
        ProfileAction::Exclude { name, ids } => {
            let added = store.add_exclusion(&name, &ids)?;
            report_change(&name, added, ids.len(), "exclusion");
        }
        ProfileAction::ExcludeConfig { name, modules } => {
            let added = store.add_exclude_config(&name, &modules)?;
            report_change(&name, added, modules.len(), "config exclusion");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_list(store: &ProfileStore) -> Result<()> {
    let profiles = store.list()?;
    if profiles.is_empty() {
        println!("No profiles in {}", store.root().as_str().dimmed());
        return Ok(());
    }

    println!("{}", "Profiles".bold());
    for profile in profiles {
        println!(
            "  {:<24} {:<7} {}",
            profile.name.cyan(),
            profile.format.to_string(),
            profile.path.as_str().dimmed()
        );
    }
    Ok(())
}

fn run_show(session: &Session, name: &str, json: bool) -> Result<()> {
    let manifest = session.resolve_manifest(name)?;
    if json {
        return print_json(&manifest);
    }

    let platform = &session.settings.platform;
    println!("{} {}", "Profile:".bold(), manifest.name.cyan());
    println!("  {} {}", "path:".dimmed(), manifest.path);
    println!("  {} {}", "chain:".dimmed(), manifest.chain.join(" -> "));
    println!(
        "  {} {} ({} inherited, {} local)",
        "apps:".dimmed(),
        manifest.net_app_count(),
        manifest.base_app_count(),
        manifest.local_app_count
    );
    for app in &manifest.apps {
        match app.native_id(platform) {
            Some(native) => println!("    {:<24} {}", app.id, native.dimmed()),
            None => println!("    {:<24} {}", app.id, format!("no {} ref", platform).yellow()),
        }
    }
    if !manifest.exclude.is_empty() {
        println!("  {} {}", "excluded:".dimmed(), manifest.exclude.join(", "));
    }
    if !manifest.config_modules.is_empty() {
        println!("  {} {}", "config modules:".dimmed(), manifest.config_modules.join(", "));
    }
    println!(
        "  {} {} verify, {} restore",
        "entries:".dimmed(),
        manifest.verify.len(),
        manifest.restore.len()
    );
    Ok(())
}

fn run_new(store: &ProfileStore, name: &str, includes: &[String]) -> Result<()> {
    let location = store.new_overlay(name, includes)?;
    println!(
        "{} profile {} at {}",
        "Created".green().bold(),
        name.cyan(),
        location.path.as_str()
    );
    if includes.is_empty() {
        println!("{} it includes nothing yet; pass --include <base> to inherit", "hint:".cyan());
    }
    Ok(())
}

fn report_change(name: &str, added: usize, requested: usize, what: &str) {
    if added == 0 {
        println!("{} {} already up to date", "OK".green().bold(), name.cyan());
        return;
    }
    println!(
        "{} {} {}(s) to {}",
        "Added".green().bold(),
        added,
        what,
        name.cyan()
    );
    if added < requested {
        println!("  {} {} already present", "skipped:".dimmed(), requested - added);
    }
}
