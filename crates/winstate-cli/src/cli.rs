//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// winstate - Declare, verify and capture the state of a Windows host
#[derive(Parser, Debug)]
#[command(name = "winstate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Stream NDJSON progress events to stderr
    #[arg(long, global = true)]
    pub events: bool,

    /// Directory holding the settings file (`<dir>/winstate/config.toml`)
    #[arg(long, global = true, env = "WINSTATE_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Override the profiles directory
    #[arg(long, global = true, env = "WINSTATE_PROFILES_DIR")]
    pub profiles_dir: Option<PathBuf>,

    /// Override the run state directory
    #[arg(long, global = true, env = "WINSTATE_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Override the log directory
    #[arg(long, global = true, env = "WINSTATE_LOGS_DIR")]
    pub logs_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check the host against a manifest without changing anything
    ///
    /// Examples:
    ///   winstate verify dev               # Profile from the profiles directory
    ///   winstate verify ./manifest.jsonc  # Manifest by path
    Verify {
        /// Manifest path or profile name
        target: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Copy the manifest's restore targets from the host into an export tree
    Export {
        /// Manifest path or profile name
        target: String,

        /// Export root (defaults to `<manifest dir>/export`)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Report what would be copied without writing
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Find installed software and suggest manifest entries
    Discover {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Write a commented manual-include template to this path
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Manage profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Inspect recorded runs
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

/// Profile subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProfileAction {
    /// List profiles in the profiles directory
    List,

    /// Show a profile's resolved view
    Show {
        name: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Create an overlay profile that includes other profiles
    New {
        name: String,

        /// Base profile to include (repeatable)
        #[arg(short, long = "include")]
        include: Vec<String>,
    },

    /// Add apps by driver-native id to a bare profile
    AddApp {
        name: String,

        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Exclude inherited apps from a bare profile
    Exclude {
        name: String,

        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Exclude inherited config modules from a bare profile
    ExcludeConfig {
        name: String,

        #[arg(required = true)]
        modules: Vec<String>,
    },
}

/// State subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StateAction {
    /// List recorded runs, oldest first
    List {
        /// Only runs of this command (verify, export, discover)
        #[arg(short, long)]
        command: Option<String>,
    },

    /// Show one run by id, or `latest`
    Show {
        run_id: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
