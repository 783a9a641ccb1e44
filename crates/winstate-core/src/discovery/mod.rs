//! Discovery of software installed outside the package driver
//!
//! Two detectors feed one report: well-known commands on `PATH`, and the
//! Windows uninstall registry. Each finding is cross-checked against the
//! driver's installed ids so only unmanaged software is suggested for
//! inclusion in a manifest.

mod engine;
mod ownership;
mod path_detector;
mod registry;
mod template;

pub use engine::{DiscoveryEngine, DiscoveryReport, DiscoverySummary};
pub use ownership::{is_owned, mark_ownership};
pub use path_detector::{CommandProbe, HostCommandProbe, KNOWN_TOOLS, KnownTool, detect_path_tools};
pub use registry::{
    RegQuerySource, RegistryDetector, UNINSTALL_ROOTS, UninstallEntry, UninstallSource,
    parse_reg_query,
};
pub use template::render_template;

use serde::{Deserialize, Serialize};

/// How a finding was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMethod {
    Path,
    Registry,
}

impl DiscoveryMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Registry => "registry",
        }
    }
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of detected software
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryEntry {
    /// Short canonical name, e.g. `git`
    pub name: String,
    pub method: DiscoveryMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Version reported by the command itself; empty when it reported none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_driver_id: Option<String>,
    #[serde(default)]
    pub owned_by_driver: bool,
}

impl DiscoveryEntry {
    pub fn new(name: impl Into<String>, method: DiscoveryMethod) -> Self {
        Self {
            name: name.into(),
            method,
            path: None,
            version: None,
            display_name: None,
            display_version: None,
            publisher: None,
            install_location: None,
            suggested_driver_id: None,
            owned_by_driver: false,
        }
    }
}

/// Stable sort by (name, method, path), all compared case-sensitively.
pub fn sort_entries(entries: &mut [DiscoveryEntry]) {
    entries.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.method.as_str().cmp(b.method.as_str()))
            .then_with(|| {
                a.path
                    .as_deref()
                    .unwrap_or_default()
                    .cmp(b.path.as_deref().unwrap_or_default())
            })
    });
}
