//! Layered settings
//!
//! Resolution order, later sources overriding earlier ones:
//!
//! 1. built-in defaults under the platform data directory
//! 2. `<config dir>/winstate/config.toml`
//! 3. command-line flags, applied by the caller on the returned value

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::{Error, Result};

const APP_DIR: &str = "winstate";
const CONFIG_FILE: &str = "config.toml";

/// Default key into app `refs`
pub const DEFAULT_PLATFORM: &str = "windows";

/// Effective settings for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub profiles_dir: PathBuf,
    pub state_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub platform: String,
    /// Stream progress events to stderr
    pub events: bool,
    /// Extra sensitive-path regexes for export
    pub sensitive_patterns: Vec<String>,
}

impl Settings {
    /// Defaults rooted at `base`
    pub fn defaults_in(base: PathBuf) -> Self {
        Self {
            profiles_dir: base.join("profiles"),
            state_dir: base.join("state"),
            logs_dir: base.join("logs"),
            platform: DEFAULT_PLATFORM.to_string(),
            events: false,
            sensitive_patterns: Vec::new(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        let base = dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR));
        Self::defaults_in(base)
    }
}

/// The config file layer; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    profiles_dir: Option<PathBuf>,
    state_dir: Option<PathBuf>,
    logs_dir: Option<PathBuf>,
    platform: Option<String>,
    events: Option<bool>,
    sensitive_patterns: Option<Vec<String>>,
}

/// Loads [`Settings`] from defaults and the user config file
#[derive(Debug, Clone, Default)]
pub struct SettingsResolver {
    /// Used instead of `dirs::config_dir()/winstate` when set (tests)
    config_dir_override: Option<PathBuf>,
    defaults: Option<Settings>,
}

impl SettingsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir_override = Some(dir.into());
        self
    }

    /// Replace the built-in defaults layer
    pub fn with_defaults(mut self, defaults: Settings) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        let dir = match &self.config_dir_override {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()?.join(APP_DIR),
        };
        Some(dir.join(CONFIG_FILE))
    }

    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = self.defaults.clone().unwrap_or_default();

        let Some(path) = self.config_path().filter(|p| p.is_file()) else {
            tracing::debug!("No settings file, using defaults");
            return Ok(settings);
        };

        let content = fs::read_to_string(&path).map_err(|e| winstate_fs::Error::io(&path, e))?;
        let file: SettingsFile = toml::from_str(&content).map_err(|e| Error::Settings {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "Loaded settings file");

        if let Some(dir) = file.profiles_dir {
            settings.profiles_dir = dir;
        }
        if let Some(dir) = file.state_dir {
            settings.state_dir = dir;
        }
        if let Some(dir) = file.logs_dir {
            settings.logs_dir = dir;
        }
        if let Some(platform) = file.platform {
            settings.platform = platform;
        }
        if let Some(events) = file.events {
            settings.events = events;
        }
        if let Some(patterns) = file.sensitive_patterns {
            settings.sensitive_patterns = patterns;
        }

        Ok(settings)
    }
}
