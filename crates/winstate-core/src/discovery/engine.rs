//! Discovery engine

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::path_detector::{CommandProbe, detect_path_tools};
use super::registry::{RegistryDetector, UninstallSource};
use super::{DiscoveryEntry, DiscoveryMethod, mark_ownership, sort_entries};
use crate::Result;
use crate::context::RunContext;
use crate::driver::PackageDriver;
use crate::events::ItemStatus;
use crate::state::{RunAction, RunState};

const PHASE: &str = "discover";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySummary {
    pub total: usize,
    pub path: usize,
    pub registry: usize,
    pub owned: usize,
    pub unowned: usize,
}

impl DiscoverySummary {
    fn from_entries(entries: &[DiscoveryEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            summary.total += 1;
            match entry.method {
                DiscoveryMethod::Path => summary.path += 1,
                DiscoveryMethod::Registry => summary.registry += 1,
            }
            if entry.owned_by_driver {
                summary.owned += 1;
            } else {
                summary.unowned += 1;
            }
        }
        summary
    }

    pub fn counters(&self) -> BTreeMap<String, usize> {
        BTreeMap::from([
            ("total".to_string(), self.total),
            ("path".to_string(), self.path),
            ("registry".to_string(), self.registry),
            ("owned".to_string(), self.owned),
            ("unowned".to_string(), self.unowned),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub run_id: String,
    /// Sorted by (name, method, path)
    pub entries: Vec<DiscoveryEntry>,
    pub summary: DiscoverySummary,
    /// Detector or driver problems that reduced coverage
    pub warnings: Vec<String>,
    pub state_file: PathBuf,
}

impl DiscoveryReport {
    pub fn unowned(&self) -> impl Iterator<Item = &DiscoveryEntry> {
        self.entries.iter().filter(|e| !e.owned_by_driver)
    }
}

/// Finds software present on the machine and who manages it
pub struct DiscoveryEngine<'a> {
    commands: &'a dyn CommandProbe,
    uninstall: &'a dyn UninstallSource,
    driver: Option<&'a dyn PackageDriver>,
}

impl<'a> DiscoveryEngine<'a> {
    pub fn new(commands: &'a dyn CommandProbe, uninstall: &'a dyn UninstallSource) -> Self {
        Self {
            commands,
            uninstall,
            driver: None,
        }
    }

    /// Cross-check findings against this driver's installed ids
    pub fn with_driver(mut self, driver: &'a dyn PackageDriver) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Run both detectors, mark ownership, sort, and persist the run.
    ///
    /// A detector or driver that cannot be queried only narrows the result;
    /// the problem is reported as a warning and an `error` event.
    pub fn run(&self, ctx: &mut RunContext) -> Result<DiscoveryReport> {
        ctx.events.phase(PHASE);
        let mut warnings = Vec::new();

        let mut entries = detect_path_tools(self.commands);

        let detector = RegistryDetector::new()?;
        match self.uninstall.entries() {
            Ok(raw) => entries.extend(detector.detect(&raw)),
            Err(e) => {
                let message = format!("registry scan failed: {}", e);
                tracing::warn!("{}", message);
                ctx.events.error("registry", &message);
                warnings.push(message);
            }
        }

        if let Some(driver) = self.driver {
            match driver.installed_ids() {
                Ok(installed) => mark_ownership(&mut entries, &installed),
                Err(e) => {
                    let message = format!("{} query failed, ownership not checked: {}", driver.name(), e);
                    tracing::warn!("{}", message);
                    ctx.events.error("driver", &message);
                    warnings.push(message);
                }
            }
        }

        sort_entries(&mut entries);
        let summary = DiscoverySummary::from_entries(&entries);

        for entry in &entries {
            let id = entry.suggested_driver_id.as_deref().unwrap_or(&entry.name);
            let status = if entry.owned_by_driver {
                ItemStatus::Skipped
            } else {
                ItemStatus::Present
            };
            let reason = entry.owned_by_driver.then_some("owned-by-driver");
            ctx.events
                .item(id, Some(entry.method.as_str()), status, reason, None);
        }

        let mut state = RunState::new(&ctx.run_id, PHASE);
        state.summary = summary.counters();
        state.actions = entries
            .iter()
            .map(|entry| {
                let status = if entry.owned_by_driver { "owned" } else { "unowned" };
                RunAction::new(entry.method.as_str(), &entry.name, status)
                    .with_driver(entry.suggested_driver_id.as_deref())
                    .with_message(entry.path.as_deref().or(entry.display_name.as_deref()))
            })
            .collect();
        let persisted = ctx.state.persist(&state);

        ctx.events
            .summary(PHASE, summary.total, summary.unowned, summary.owned, 0);
        tracing::info!(total = summary.total, owned = summary.owned, "Discovery complete");
        let state_file = persisted?;

        Ok(DiscoveryReport {
            run_id: ctx.run_id.clone(),
            entries,
            summary,
            warnings,
            state_file,
        })
    }
}
