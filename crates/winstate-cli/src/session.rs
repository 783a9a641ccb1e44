//! Per-invocation settings and run setup

use std::path::Path;

use winstate_core::manifest::ManifestResolver;
use winstate_core::state::new_run_id;
use winstate_core::{
    EventEmitter, ProfileStore, ResolvedManifest, RunContext, Settings, SettingsResolver,
    StateStore,
};

use crate::cli::Cli;
use crate::error::Result;
use crate::logging;

/// Effective settings plus the global flags that shape a run
#[derive(Debug, Clone)]
pub struct Session {
    pub settings: Settings,
    pub verbose: bool,
}

impl Session {
    /// Layer flag overrides on top of the resolved settings file
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut resolver = SettingsResolver::new();
        if let Some(dir) = &cli.config_dir {
            resolver = resolver.with_config_dir(dir.join("winstate"));
        }
        let mut settings = resolver.resolve()?;

        if let Some(dir) = &cli.profiles_dir {
            settings.profiles_dir = dir.clone();
        }
        if let Some(dir) = &cli.state_dir {
            settings.state_dir = dir.clone();
        }
        if let Some(dir) = &cli.logs_dir {
            settings.logs_dir = dir.clone();
        }
        if cli.events {
            settings.events = true;
        }

        Ok(Self {
            settings,
            verbose: cli.verbose,
        })
    }

    pub fn profile_store(&self) -> ProfileStore {
        ProfileStore::new(self.settings.profiles_dir.as_path())
    }

    pub fn state_store(&self) -> StateStore {
        StateStore::new(&self.settings.state_dir)
    }

    /// Logging for commands that do not record a run
    pub fn init_logging(&self) -> Result<()> {
        logging::init(self.verbose, None)
    }

    /// Start a recorded run: fresh id, per-run log file, optional event stream.
    pub fn start_run(&self, command: &str) -> Result<RunContext> {
        let run_id = new_run_id();
        let logs_dir = &self.settings.logs_dir;
        let log_file = logs_dir.join(format!("{}-{}.log", command, run_id));
        logging::init(self.verbose, Some(&log_file))?;

        let mut ctx = RunContext::new(&self.settings.platform, self.state_store())
            .with_run_id(&run_id)
            .with_log_file(log_file);
        if self.settings.events {
            let events_file = logs_dir.join(format!("{}-{}.events.jsonl", command, run_id));
            ctx = ctx.with_events(EventEmitter::stderr().tee_to_file(&events_file)?);
        }

        tracing::info!(command, run_id = %run_id, "Run started");
        Ok(ctx)
    }

    /// Resolve a manifest path, or a profile name from the profiles directory
    pub fn resolve_manifest(&self, target: &str) -> Result<ResolvedManifest> {
        let resolver = ManifestResolver::new(&self.settings.platform);
        let path = Path::new(target);
        if path.exists() || looks_like_path(target) {
            return Ok(resolver.read_resolved(path)?);
        }

        let location = self.profile_store().locate(target)?;
        Ok(resolver.resolve_location(&location)?)
    }
}

fn looks_like_path(target: &str) -> bool {
    target.contains('/')
        || target.contains('\\')
        || target.ends_with(".jsonc")
        || target.ends_with(".json")
        || target.ends_with(".zip")
}
