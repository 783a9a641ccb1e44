//! Export engine
//!
//! Runs a manifest's `restore` declarations in reverse: each expanded
//! `target` on the live system is copied to `<export root>/<source>`.
//! The run is not transactional. Files copied before a failing entry stay
//! where they are and later entries still run.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use winstate_fs::{NormalizedPath, expand_placeholders, io};

use super::policy::SensitivePathPolicy;
use crate::Result;
use crate::context::RunContext;
use crate::events::ItemStatus;
use crate::manifest::{ProfileLocation, ResolvedManifest, RestoreEntry};
use crate::state::{ManifestRef, RunAction, RunState};

const PHASE: &str = "export";

/// Name of the manifest copy written next to exported files
pub const SNAPSHOT_FILE: &str = "manifest.snapshot";

const NOT_FOUND: &str = "not found on system";
const DRY_RUN: &str = "dry-run";
const ESCAPES_ROOT: &str = "source escapes export root";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub export_root: PathBuf,
    /// Report what would be copied without writing anything
    pub dry_run: bool,
}

impl ExportOptions {
    /// `<manifest dir>/export`
    pub fn default_root(manifest: &ResolvedManifest) -> PathBuf {
        NormalizedPath::new(&manifest.path)
            .parent()
            .map(|dir| dir.join("export").to_native())
            .unwrap_or_else(|| PathBuf::from("export"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportStatus {
    Success,
    Skipped,
    Failed,
    DryRun,
}

impl ExportStatus {
    /// Item events only speak success/skipped/failed; dry-run rides on `reason`
    fn item_status(self) -> ItemStatus {
        match self {
            Self::Success => ItemStatus::Success,
            Self::Skipped | Self::DryRun => ItemStatus::Skipped,
            Self::Failed => ItemStatus::Failed,
        }
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
            Self::DryRun => write!(f, "dry-run"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    /// The entry's `source`, relative to the export root
    pub source: String,
    /// Expanded system path that was read
    pub target: String,
    pub destination: String,
    pub status: ExportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// `warned` overlaps the other counters; dry-run items count as exported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub total: usize,
    pub exported: usize,
    pub skipped: usize,
    pub failed: usize,
    pub warned: usize,
}

impl ExportSummary {
    pub fn counters(&self) -> BTreeMap<String, usize> {
        BTreeMap::from([
            ("total".to_string(), self.total),
            ("exported".to_string(), self.exported),
            ("skipped".to_string(), self.skipped),
            ("failed".to_string(), self.failed),
            ("warned".to_string(), self.warned),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub run_id: String,
    pub manifest: ManifestRef,
    pub export_root: PathBuf,
    pub dry_run: bool,
    pub results: Vec<ExportResult>,
    pub summary: ExportSummary,
    /// Snapshot path, when one was written
    pub snapshot: Option<PathBuf>,
    /// Non-item problems such as a failed snapshot
    pub warnings: Vec<String>,
    pub state_file: PathBuf,
}

impl ExportReport {
    pub fn success(&self) -> bool {
        self.summary.failed == 0
    }
}

pub struct ExportEngine {
    policy: SensitivePathPolicy,
}

impl ExportEngine {
    pub fn new(policy: SensitivePathPolicy) -> Self {
        Self { policy }
    }

    /// Capture every restore entry of `manifest` under `options.export_root`.
    pub fn run(
        &self,
        ctx: &mut RunContext,
        manifest: &ResolvedManifest,
        options: &ExportOptions,
    ) -> Result<ExportReport> {
        let manifest_ref = ManifestRef::from_resolved(manifest)?;
        ctx.events.phase(PHASE);
        tracing::info!(
            manifest = %manifest.name,
            entries = manifest.restore.len(),
            root = %options.export_root.display(),
            dry_run = options.dry_run,
            "Starting export"
        );

        let mut summary = ExportSummary::default();
        let mut results = Vec::with_capacity(manifest.restore.len());
        for entry in &manifest.restore {
            let result = self.export_entry(entry, options);

            summary.total += 1;
            match result.status {
                ExportStatus::Success | ExportStatus::DryRun => summary.exported += 1,
                ExportStatus::Skipped => summary.skipped += 1,
                ExportStatus::Failed => summary.failed += 1,
            }
            if !result.warnings.is_empty() {
                summary.warned += 1;
                tracing::warn!(target_path = %result.target, warnings = ?result.warnings, "Sensitive path exported");
            }

            let message = result.message.clone().or_else(|| result.warnings.first().cloned());
            ctx.events.item(
                &result.source,
                None,
                result.status.item_status(),
                result.reason.as_deref(),
                message.as_deref(),
            );
            results.push(result);
        }

        let mut warnings = Vec::new();
        let snapshot = if options.dry_run {
            None
        } else {
            match write_snapshot(manifest, &options.export_root) {
                Ok(path) => {
                    ctx.events.artifact("snapshot", &path.display().to_string());
                    Some(path)
                }
                Err(e) => {
                    let message = format!("manifest snapshot failed: {}", e);
                    tracing::warn!("{}", message);
                    ctx.events.error("snapshot", &message);
                    warnings.push(message);
                    None
                }
            }
        };

        let mut report = ExportReport {
            run_id: ctx.run_id.clone(),
            manifest: manifest_ref,
            export_root: options.export_root.clone(),
            dry_run: options.dry_run,
            results,
            summary,
            snapshot,
            warnings,
            state_file: PathBuf::new(),
        };

        let mut state = RunState::new(&ctx.run_id, PHASE);
        state.manifest = Some(report.manifest.clone());
        state.success = report.success();
        state.summary = summary.counters();
        state.actions = report
            .results
            .iter()
            .map(|r| {
                RunAction::new("restore", &r.source, r.status)
                    .with_message(r.message.as_deref().or(r.reason.as_deref()))
            })
            .collect();
        let persisted = ctx.state.persist(&state);

        ctx.events
            .summary(PHASE, summary.total, summary.exported, summary.skipped, summary.failed);
        tracing::info!(
            exported = summary.exported,
            skipped = summary.skipped,
            failed = summary.failed,
            warned = summary.warned,
            "Export complete"
        );
        report.state_file = persisted?;

        Ok(report)
    }

    fn export_entry(&self, entry: &RestoreEntry, options: &ExportOptions) -> ExportResult {
        let target = expand_placeholders(&entry.target);
        let destination = options.export_root.join(&entry.source);
        let warnings = self.policy.evaluate(&target);

        let mut result = ExportResult {
            source: entry.source.clone(),
            target: target.clone(),
            destination: destination.display().to_string(),
            status: ExportStatus::Skipped,
            reason: None,
            message: None,
            warnings,
        };

        if escapes_root(&entry.source) {
            tracing::warn!(source = %entry.source, "Restore source escapes export root");
            result.status = ExportStatus::Failed;
            result.message = Some(ESCAPES_ROOT.to_string());
            return result;
        }

        let target_path = Path::new(&target);
        if !target_path.exists() {
            result.reason = Some(NOT_FOUND.to_string());
            return result;
        }

        if options.dry_run {
            result.status = ExportStatus::DryRun;
            result.reason = Some(DRY_RUN.to_string());
            result.message = Some(format!("would copy {} -> {}", target, result.destination));
            return result;
        }

        let copied = if target_path.is_dir() {
            io::replace_dir(target_path, &destination)
        } else {
            io::copy_file(target_path, &destination).map(|_| 1)
        };

        match copied {
            Ok(files) => {
                tracing::debug!(source = %entry.source, files, "Exported entry");
                result.status = ExportStatus::Success;
            }
            Err(e) => {
                tracing::debug!(source = %entry.source, error = %e, "Export entry failed");
                result.status = ExportStatus::Failed;
                result.message = Some(e.to_string());
            }
        }
        result
    }
}

/// `source` must stay below the export root: no root, drive prefix or `..`.
fn escapes_root(source: &str) -> bool {
    Path::new(source)
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_) | Component::ParentDir))
}

fn write_snapshot(manifest: &ResolvedManifest, export_root: &Path) -> Result<PathBuf> {
    let content = ProfileLocation::from_path(Path::new(&manifest.path))?.read_content()?;
    let path = export_root.join(SNAPSHOT_FILE);
    io::write_atomic(&NormalizedPath::new(&path), content.as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("configs/settings.json", false)]
    #[case("./nested/dir", false)]
    #[case("../outside", true)]
    #[case("configs/../../outside", true)]
    #[case("/etc/passwd", true)]
    fn source_must_stay_below_root(#[case] source: &str, #[case] escapes: bool) {
        assert_eq!(escapes_root(source), escapes);
    }
}
