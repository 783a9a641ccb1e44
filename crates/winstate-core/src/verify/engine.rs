//! Verify engine
//!
//! Walks a resolved manifest against the live system:
//!
//! 1. apps with a native ref for the active platform are checked against the
//!    driver's installed ids, queried once per run;
//! 2. every explicit verify entry is converted to a [`VerifyCheck`] and run;
//! 3. results are summarized, persisted as run state and reported.
//!
//! No single item ever aborts the run. Apps without a native ref are
//! reported as `skip` and take no part in the pass/fail totals, so
//! `pass + fail` always equals the number of ref-bearing apps plus the
//! number of verify entries.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::check::{SystemProbe, VerifyCheck};
use crate::Result;
use crate::context::RunContext;
use crate::driver::PackageDriver;
use crate::envelope::ErrorObject;
use crate::events::ItemStatus;
use crate::manifest::ResolvedManifest;
use crate::state::{ManifestRef, RunAction, RunState};

const PHASE: &str = "verify";

/// Error code attached to runs with failures
pub const VERIFY_FAILED: &str = "VERIFY_FAILED";

/// What a result line refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyKind {
    App,
    Verify,
}

impl std::fmt::Display for VerifyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::App => write!(f, "app"),
            Self::Verify => write!(f, "verify"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyStatus {
    Pass,
    Fail,
    Skip,
}

impl std::fmt::Display for VerifyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Outcome of one app or verify entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    pub kind: VerifyKind,
    /// Native id for apps, check subject for verify entries
    pub id: String,
    /// Driver name for apps, verify type for verify entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    pub status: VerifyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifySummary {
    pub total: usize,
    pub pass: usize,
    pub fail: usize,
    pub skip: usize,
}

impl VerifySummary {
    fn record(&mut self, status: VerifyStatus) {
        self.total += 1;
        match status {
            VerifyStatus::Pass => self.pass += 1,
            VerifyStatus::Fail => self.fail += 1,
            VerifyStatus::Skip => self.skip += 1,
        }
    }

    pub fn counters(&self) -> BTreeMap<String, usize> {
        BTreeMap::from([
            ("total".to_string(), self.total),
            ("pass".to_string(), self.pass),
            ("fail".to_string(), self.fail),
            ("skip".to_string(), self.skip),
        ])
    }
}

/// Everything a verify run produced
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub run_id: String,
    pub manifest: ManifestRef,
    pub results: Vec<VerifyResult>,
    pub summary: VerifySummary,
    pub error: Option<ErrorObject>,
    pub state_file: PathBuf,
}

impl VerifyReport {
    pub fn success(&self) -> bool {
        self.summary.fail == 0
    }

    /// Native ids of apps the driver does not report as installed
    pub fn missing_apps(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.kind == VerifyKind::App && r.status == VerifyStatus::Fail)
            .map(|r| r.id.as_str())
            .collect()
    }

    pub fn failed_verifiers(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.kind == VerifyKind::Verify && r.status == VerifyStatus::Fail)
            .count()
    }
}

/// Compares a resolved manifest with what is actually installed
pub struct VerifyEngine<'a> {
    driver: &'a dyn PackageDriver,
    probe: &'a dyn SystemProbe,
}

impl<'a> VerifyEngine<'a> {
    pub fn new(driver: &'a dyn PackageDriver, probe: &'a dyn SystemProbe) -> Self {
        Self { driver, probe }
    }

    /// Verify `manifest` and persist the run.
    ///
    /// # Errors
    ///
    /// Only when the manifest cannot be hashed or the run state cannot be
    /// written. Item failures are part of the report.
    pub fn run(&self, ctx: &mut RunContext, manifest: &ResolvedManifest) -> Result<VerifyReport> {
        let manifest_ref = ManifestRef::from_resolved(manifest)?;
        ctx.events.phase(PHASE);
        tracing::info!(manifest = %manifest.name, apps = manifest.apps.len(), checks = manifest.verify.len(), "Starting verify");

        let mut results = Vec::with_capacity(manifest.apps.len() + manifest.verify.len());
        self.check_apps(ctx, manifest, &mut results);
        self.check_entries(ctx, manifest, &mut results);

        let mut summary = VerifySummary::default();
        for result in &results {
            summary.record(result.status);
        }

        let mut report = VerifyReport {
            run_id: ctx.run_id.clone(),
            manifest: manifest_ref,
            results,
            summary,
            error: None,
            state_file: PathBuf::new(),
        };
        if !report.success() {
            report.error = Some(failure_object(&report));
        }

        let mut state = RunState::new(&ctx.run_id, PHASE);
        state.manifest = Some(report.manifest.clone());
        state.success = report.success();
        state.summary = report.summary.counters();
        state.actions = report
            .results
            .iter()
            .map(|r| {
                RunAction::new(&r.kind.to_string(), &r.id, r.status)
                    .with_driver(r.driver.as_deref())
                    .with_message(r.message.as_deref())
            })
            .collect();
        state.error = report.error.clone();
        // The phase closes with a summary even when the record cannot be saved
        let persisted = ctx.state.persist(&state);

        ctx.events
            .summary(PHASE, summary.total, summary.pass, summary.skip, summary.fail);
        tracing::info!(pass = summary.pass, fail = summary.fail, skip = summary.skip, "Verify complete");
        report.state_file = persisted?;

        Ok(report)
    }

    fn check_apps(&self, ctx: &mut RunContext, manifest: &ResolvedManifest, results: &mut Vec<VerifyResult>) {
        let driver = self.driver.name().to_string();
        let needs_driver = manifest
            .apps
            .iter()
            .any(|app| app.native_id(&ctx.platform).is_some());

        // One query per run; a driver that cannot be queried fails every app
        let installed: std::result::Result<HashSet<String>, String> = if needs_driver {
            self.driver
                .installed_ids()
                .map(|ids| ids.iter().map(|id| id.to_lowercase()).collect())
                .map_err(|e| e.to_string())
        } else {
            Ok(HashSet::new())
        };
        if let Err(message) = &installed {
            tracing::warn!(driver = %driver, error = %message, "Driver query failed");
            ctx.events.error("driver", message);
        }

        for app in &manifest.apps {
            let Some(native) = app.native_id(&ctx.platform) else {
                let message = format!("no {} ref", ctx.platform);
                ctx.events
                    .item(&app.id, None, ItemStatus::Skipped, Some("no-ref"), Some(&message));
                results.push(VerifyResult {
                    kind: VerifyKind::App,
                    id: app.id.clone(),
                    driver: None,
                    status: VerifyStatus::Skip,
                    message: Some(message),
                });
                continue;
            };

            let (status, message) = match &installed {
                Ok(ids) if ids.contains(&native.to_lowercase()) => (VerifyStatus::Pass, None),
                Ok(_) => (VerifyStatus::Fail, Some("not installed".to_string())),
                Err(e) => (VerifyStatus::Fail, Some(format!("driver query failed: {}", e))),
            };
            let event_status = match status {
                VerifyStatus::Pass => ItemStatus::Present,
                _ => ItemStatus::Missing,
            };
            ctx.events
                .item(native, Some(&driver), event_status, None, message.as_deref());
            results.push(VerifyResult {
                kind: VerifyKind::App,
                id: native.to_string(),
                driver: Some(driver.clone()),
                status,
                message,
            });
        }
    }

    fn check_entries(&self, ctx: &mut RunContext, manifest: &ResolvedManifest, results: &mut Vec<VerifyResult>) {
        for entry in &manifest.verify {
            let (id, status, message) = match VerifyCheck::try_from(entry) {
                Ok(check) => {
                    let outcome = check.run(self.probe);
                    let status = if outcome.success {
                        VerifyStatus::Pass
                    } else {
                        VerifyStatus::Fail
                    };
                    (check.subject(), status, outcome.message)
                }
                Err(e) => (entry.type_name.clone(), VerifyStatus::Fail, e.to_string()),
            };

            let event_status = if status == VerifyStatus::Pass {
                ItemStatus::Success
            } else {
                ItemStatus::Failed
            };
            ctx.events.item(
                &id,
                Some(&entry.type_name),
                event_status,
                None,
                Some(&message),
            );
            results.push(VerifyResult {
                kind: VerifyKind::Verify,
                id,
                driver: Some(entry.type_name.clone()),
                status,
                message: Some(message),
            });
        }
    }
}

fn failure_object(report: &VerifyReport) -> ErrorObject {
    let missing = report.missing_apps();
    let failed_verifiers = report.failed_verifiers();
    ErrorObject::new(
        VERIFY_FAILED,
        format!(
            "{} app(s) missing, {} verifier(s) failed",
            missing.len(),
            failed_verifiers
        ),
    )
    .with_detail(json!({
        "missingApps": missing,
        "failedVerifiers": failed_verifiers,
    }))
    .with_remediation("Run apply for this manifest to install missing apps, then verify again")
}
