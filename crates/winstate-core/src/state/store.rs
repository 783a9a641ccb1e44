use std::fs;
use std::path::{Path, PathBuf};

use winstate_fs::io;

use super::RunState;
use crate::{Error, Result};

/// A run record together with the file it was loaded from
#[derive(Debug, Clone)]
pub struct StoredRun {
    pub path: PathBuf,
    pub state: RunState,
}

/// Directory of run-state records
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a record as `<command>-<runId>.json`.
    ///
    /// Records are never rewritten: an existing file with the same name is
    /// an error.
    pub fn persist(&self, state: &RunState) -> Result<PathBuf> {
        let path = self.dir.join(state.file_name());
        let mut content = serde_json::to_string_pretty(state)?;
        content.push('\n');
        io::write_new(&path, content.as_bytes())?;

        tracing::debug!(path = %path.display(), actions = state.actions.len(), "Persisted run state");
        Ok(path)
    }

    pub fn load(&self, path: &Path) -> Result<RunState> {
        let content = fs::read_to_string(path).map_err(|e| winstate_fs::Error::io(path, e))?;
        RunState::parse(&content, path)
    }

    /// All readable records, oldest first.
    ///
    /// Files that do not parse as run state are skipped with a warning.
    pub fn list(&self) -> Result<Vec<StoredRun>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match self.load(&path) {
                Ok(state) => runs.push(StoredRun { path, state }),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable run state"),
            }
        }

        runs.sort_by(|a, b| {
            a.state
                .timestamp
                .cmp(&b.state.timestamp)
                .then_with(|| a.state.run_id.cmp(&b.state.run_id))
        });
        Ok(runs)
    }

    /// Most recent record, optionally restricted to one command
    pub fn latest(&self, command: Option<&str>) -> Result<Option<StoredRun>> {
        Ok(self
            .list()?
            .into_iter()
            .rfind(|run| command.is_none_or(|c| run.state.command == c)))
    }

    pub fn find(&self, run_id: &str) -> Result<StoredRun> {
        self.list()?
            .into_iter()
            .find(|run| run.state.run_id == run_id)
            .ok_or_else(|| Error::RunNotFound {
                id: run_id.to_string(),
            })
    }
}
