//! Per-run context threaded through every operation

use std::path::{Path, PathBuf};

use crate::events::EventEmitter;
use crate::state::{StateStore, new_run_id};

/// Everything an operation needs that is not its own input.
///
/// Event streaming is a property of the context, so two runs in one
/// process can differ without touching shared state.
#[derive(Debug)]
pub struct RunContext {
    pub run_id: String,
    /// Key into app `refs`, e.g. `windows`
    pub platform: String,
    pub events: EventEmitter,
    pub state: StateStore,
    pub log_file: Option<PathBuf>,
}

impl RunContext {
    /// A context with a fresh run id and events disabled
    pub fn new(platform: impl Into<String>, state: StateStore) -> Self {
        Self {
            run_id: new_run_id(),
            platform: platform.into(),
            events: EventEmitter::disabled(),
            state,
            log_file: None,
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn with_events(mut self, events: EventEmitter) -> Self {
        self.events = events;
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn events_file(&self) -> Option<&Path> {
        self.events.events_file()
    }
}
