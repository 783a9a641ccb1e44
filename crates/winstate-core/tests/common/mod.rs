//! Fakes for the traits the engines consume

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use winstate_core::discovery::{CommandProbe, UninstallEntry, UninstallSource};
use winstate_core::{Error, PackageDriver, Result, RunContext, StateStore, SystemProbe};

/// Driver returning a fixed id list and counting queries
pub struct FakeDriver {
    ids: Vec<String>,
    fail: bool,
    pub queries: Cell<usize>,
}

impl FakeDriver {
    pub fn with_ids(ids: &[&str]) -> Self {
        Self {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            fail: false,
            queries: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            ids: Vec::new(),
            fail: true,
            queries: Cell::new(0),
        }
    }
}

impl PackageDriver for FakeDriver {
    fn name(&self) -> &str {
        "fake"
    }

    fn installed_ids(&self) -> Result<Vec<String>> {
        self.queries.set(self.queries.get() + 1);
        if self.fail {
            return Err(Error::Driver {
                driver: "fake".into(),
                message: "service unavailable".into(),
            });
        }
        Ok(self.ids.clone())
    }
}

/// Probe answering from fixed sets
#[derive(Default)]
pub struct FakeProbe {
    pub paths: HashSet<PathBuf>,
    pub commands: HashSet<String>,
    pub registry: HashSet<String>,
}

impl SystemProbe for FakeProbe {
    fn path_exists(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    fn command_exists(&self, command: &str) -> bool {
        self.commands.contains(command)
    }

    fn registry_value_exists(&self, key: &str, value: Option<&str>) -> bool {
        let full = match value {
            Some(v) => format!("{}\\{}", key, v),
            None => key.to_string(),
        };
        self.registry.contains(&full)
    }
}

/// PATH probe over a fixed command table
#[derive(Default)]
pub struct FakeCommands {
    pub tools: HashMap<String, (PathBuf, Option<String>)>,
}

impl FakeCommands {
    pub fn with(mut self, command: &str, path: &str, version_output: Option<&str>) -> Self {
        self.tools.insert(
            command.to_string(),
            (PathBuf::from(path), version_output.map(str::to_string)),
        );
        self
    }
}

impl CommandProbe for FakeCommands {
    fn resolve(&self, command: &str) -> Option<PathBuf> {
        self.tools.get(command).map(|(path, _)| path.clone())
    }

    fn version_output(&self, path: &Path) -> Option<String> {
        self.tools
            .values()
            .find(|(p, _)| p == path)
            .and_then(|(_, version)| version.clone())
    }
}

/// Uninstall source over a fixed entry list
#[derive(Default)]
pub struct FakeUninstall {
    pub entries: Vec<UninstallEntry>,
    pub fail: bool,
}

impl FakeUninstall {
    pub fn with(mut self, display_name: &str, version: &str) -> Self {
        self.entries.push(UninstallEntry {
            key: format!("HKEY_LOCAL_MACHINE\\Uninstall\\{}", display_name),
            display_name: Some(display_name.to_string()),
            display_version: Some(version.to_string()).filter(|v| !v.is_empty()),
            publisher: None,
            install_location: None,
        });
        self
    }
}

impl UninstallSource for FakeUninstall {
    fn entries(&self) -> Result<Vec<UninstallEntry>> {
        if self.fail {
            return Err(Error::Driver {
                driver: "registry".into(),
                message: "reg unavailable".into(),
            });
        }
        Ok(self.entries.clone())
    }
}

pub fn context(state_dir: &Path) -> RunContext {
    RunContext::new("windows", StateStore::new(state_dir))
}
