//! Manifest entity types
//!
//! [`RawManifest`] mirrors exactly what one profile file contains; every list
//! is optional so a field that is absent stays absent when the file is
//! written back. [`ResolvedManifest`] is the read-only result of walking the
//! include chain and has no path back to disk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One desired application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEntry {
    /// Logical identifier, stable across platforms
    pub id: String,

    /// Driver-native identifiers keyed by platform, e.g. `{"windows": "Git.Git"}`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub refs: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Fields this crate does not interpret, preserved on rewrite
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppEntry {
    /// Build an entry for a driver-native id, deriving the logical id from it.
    pub fn from_native_id(platform: &str, native_id: &str) -> Self {
        let mut refs = BTreeMap::new();
        refs.insert(platform.to_string(), native_id.to_string());
        Self {
            id: logical_id_for(native_id),
            refs,
            display_name: None,
            extra: Map::new(),
        }
    }

    /// The driver-native id for `platform`, if declared
    pub fn native_id(&self, platform: &str) -> Option<&str> {
        self.refs
            .get(platform)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Key used for duplicate detection during merge.
    ///
    /// Two entries are the same app when their native ids for the active
    /// platform match. Entries without a native id fall back to the logical id.
    pub fn dedupe_key(&self, platform: &str) -> &str {
        self.native_id(platform).unwrap_or(&self.id)
    }

    /// Whether an exclusion string names this entry
    pub fn matches_exclusion(&self, platform: &str, excluded: &str) -> bool {
        self.native_id(platform) == Some(excluded) || self.id == excluded
    }
}

/// `Git.Git` -> `git-git`
fn logical_id_for(native_id: &str) -> String {
    let mut out = String::with_capacity(native_id.len());
    let mut pending_dash = false;
    for c in native_id.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// One verification check, kept in its declared shape.
///
/// The `type` tag is only interpreted when the check runs (see
/// [`VerifyCheck`](crate::verify::VerifyCheck)), so a manifest naming a
/// verifier this build does not know still loads and the entry is reported
/// as a failed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyEntry {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl VerifyEntry {
    pub fn new(type_name: &str, params: &[(&str, &str)]) -> Self {
        Self {
            type_name: type_name.to_string(),
            params: params
                .iter()
                .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
                .collect(),
        }
    }

    /// String parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }
}

/// A configuration file or directory restored at install time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreEntry {
    /// Path relative to the profile's asset root
    pub source: String,

    /// System path, may contain environment placeholders
    pub target: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RestoreEntry {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            extra: Map::new(),
        }
    }
}

/// Fields physically present in a single profile file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Base profile names, resolved in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<String>>,

    /// App ids removed from the resolved app list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    /// Config-module ids removed from the resolved module list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_configs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_modules: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<AppEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<Vec<VerifyEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore: Option<Vec<RestoreEntry>>,

    /// Top-level keys this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawManifest {
    /// Number of apps declared locally in this file
    pub fn local_app_count(&self) -> usize {
        self.apps.as_ref().map_or(0, Vec::len)
    }
}

/// The effective desired state after inheritance and exclusion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedManifest {
    /// Path of the manifest this view was resolved from
    pub path: String,
    pub name: String,
    pub version: u32,
    pub apps: Vec<AppEntry>,
    pub verify: Vec<VerifyEntry>,
    pub restore: Vec<RestoreEntry>,
    pub config_modules: Vec<String>,
    /// Direct includes of the root profile
    pub includes: Vec<String>,
    /// Exclusions merged across the whole chain
    pub exclude: Vec<String>,
    pub exclude_configs: Vec<String>,
    /// Every profile that contributed, base-first, root last
    pub chain: Vec<String>,
    /// Apps declared in the root file itself
    pub local_app_count: usize,
}

impl ResolvedManifest {
    pub fn net_app_count(&self) -> usize {
        self.apps.len()
    }

    /// Derived, not queried: net count minus the root's own apps.
    ///
    /// Zero when every inherited app was excluded.
    pub fn base_app_count(&self) -> usize {
        self.net_app_count().saturating_sub(self.local_app_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absent_fields_stay_absent_on_rewrite() {
        let raw: RawManifest = serde_json::from_str(r#"{"name": "dev", "apps": []}"#).unwrap();
        assert_eq!(raw.exclude, None);
        assert_eq!(raw.apps, Some(vec![]));

        let written = serde_json::to_string(&raw).unwrap();
        assert_eq!(written, r#"{"name":"dev","apps":[]}"#);
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let raw: RawManifest =
            serde_json::from_str(r#"{"name": "dev", "captured": "2026-01-01", "apps": [{"id": "git", "refs": {"windows": "Git.Git"}, "pin": true}]}"#)
                .unwrap();
        let written = serde_json::to_value(&raw).unwrap();
        assert_eq!(written["captured"], "2026-01-01");
        assert_eq!(written["apps"][0]["pin"], true);
    }

    #[test]
    fn dedupe_key_prefers_native_id() {
        let app = AppEntry::from_native_id("windows", "Git.Git");
        assert_eq!(app.id, "git-git");
        assert_eq!(app.dedupe_key("windows"), "Git.Git");
        assert_eq!(app.dedupe_key("linux"), "git-git");
    }

    #[test]
    fn logical_id_collapses_separators() {
        assert_eq!(logical_id_for("Microsoft.VisualStudioCode"), "microsoft-visualstudiocode");
        assert_eq!(logical_id_for("7zip.7zip"), "7zip-7zip");
        assert_eq!(logical_id_for("..Odd__Id.."), "odd-id");
    }

    #[test]
    fn verify_entry_keeps_params_flat() {
        let entry: VerifyEntry =
            serde_json::from_str(r#"{"type": "file-exists", "path": "C:/tools/x.exe"}"#).unwrap();
        assert_eq!(entry.type_name, "file-exists");
        assert_eq!(entry.param("path"), Some("C:/tools/x.exe"));
    }
}
