//! Versioned progress event stream
//!
//! Every operation reports progress as newline-delimited JSON records:
//!
//! ```text
//! {"version":1,"event":"phase","phase":"verify","timestamp":"2026-01-02T03:04:05.678Z"}
//! {"version":1,"event":"item","id":"Git.Git","driver":"winget","status":"present","timestamp":"..."}
//! {"version":1,"event":"summary","phase":"verify","total":3,"success":2,"skipped":0,"failed":1,"timestamp":"..."}
//! ```
//!
//! The stream is advisory. Consumers use it for progress display only; the
//! run-state file and the JSON envelope are the authoritative results.
//! Whether events are written at all is decided by the emitter a caller puts
//! in its [`RunContext`](crate::RunContext).

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Schema version stamped on every record
pub const EVENT_SCHEMA_VERSION: u32 = 1;

/// Status vocabulary for `item` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Desired item is present on the system
    Present,
    /// Desired item is absent from the system
    Missing,
    /// Item processed successfully
    Success,
    /// Item intentionally not processed
    Skipped,
    /// Item processing failed
    Failed,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Present => "present",
            Self::Missing => "missing",
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum Event {
    /// An operation phase started
    Phase { phase: String },
    /// One item was processed
    Item {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        driver: Option<String>,
        status: ItemStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// A phase completed with these totals
    Summary {
        phase: String,
        total: usize,
        success: usize,
        skipped: usize,
        failed: usize,
    },
    /// A file was produced
    Artifact { kind: String, path: String },
    /// A non-item error occurred
    Error { scope: String, message: String },
}

/// A serialized event line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub version: u32,
    #[serde(flatten)]
    pub event: Event,
    pub timestamp: String,
}

impl EventRecord {
    pub fn new(event: Event) -> Self {
        Self {
            version: EVENT_SCHEMA_VERSION,
            event,
            timestamp: timestamp_now(),
        }
    }
}

/// Current UTC time with millisecond precision and a `Z` suffix.
pub fn timestamp_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Writes event records to zero or more sinks.
pub struct EventEmitter {
    enabled: bool,
    sinks: Vec<Box<dyn Write + Send>>,
    events_file: Option<PathBuf>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("enabled", &self.enabled)
            .field("sinks", &self.sinks.len())
            .field("events_file", &self.events_file)
            .finish()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::disabled()
    }
}

impl EventEmitter {
    /// An emitter that drops every event
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            sinks: Vec::new(),
            events_file: None,
        }
    }

    /// An emitter writing to the process error stream
    pub fn stderr() -> Self {
        Self::with_writer(std::io::stderr())
    }

    /// An emitter writing to an arbitrary sink
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            enabled: true,
            sinks: vec![Box::new(writer)],
            events_file: None,
        }
    }

    /// Also append every record to `path`.
    pub fn tee_to_file(mut self, path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        self.enabled = true;
        self.sinks.push(Box::new(file));
        self.events_file = Some(path.to_path_buf());
        Ok(self)
    }

    /// Path of the events file, when teeing to one
    pub fn events_file(&self) -> Option<&Path> {
        self.events_file.as_deref()
    }

    /// Emit one record. Sink failures are ignored.
    pub fn emit(&mut self, event: Event) {
        if !self.enabled {
            return;
        }

        let record = EventRecord::new(event);
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize event");
                return;
            }
        };

        for sink in &mut self.sinks {
            let _ = writeln!(sink, "{}", line);
            let _ = sink.flush();
        }
    }

    pub fn phase(&mut self, phase: &str) {
        self.emit(Event::Phase {
            phase: phase.to_string(),
        });
    }

    pub fn item(
        &mut self,
        id: &str,
        driver: Option<&str>,
        status: ItemStatus,
        reason: Option<&str>,
        message: Option<&str>,
    ) {
        self.emit(Event::Item {
            id: id.to_string(),
            driver: driver.map(str::to_string),
            status,
            reason: reason.map(str::to_string),
            message: message.map(str::to_string),
        });
    }

    pub fn summary(&mut self, phase: &str, total: usize, success: usize, skipped: usize, failed: usize) {
        self.emit(Event::Summary {
            phase: phase.to_string(),
            total,
            success,
            skipped,
            failed,
        });
    }

    pub fn artifact(&mut self, kind: &str, path: &str) {
        self.emit(Event::Artifact {
            kind: kind.to_string(),
            path: path.to_string(),
        });
    }

    pub fn error(&mut self, scope: &str, message: &str) {
        self.emit(Event::Error {
            scope: scope.to_string(),
            message: message.to_string(),
        });
    }
}

/// In-memory sink, for embedding callers and tests that inspect the stream.
#[derive(Debug, Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<u8>>>);

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every complete line written so far.
    pub fn records(&self) -> Vec<EventRecord> {
        let bytes = match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut guard) => guard.extend_from_slice(buf),
            Err(poisoned) => poisoned.into_inner().extend_from_slice(buf),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
