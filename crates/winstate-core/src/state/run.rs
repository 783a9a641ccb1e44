use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use winstate_fs::file_hash;

use crate::envelope::ErrorObject;
use crate::events::timestamp_now;
use crate::manifest::ResolvedManifest;
use crate::{Error, Result};

/// Generate a run id: `<UTC yyyyMMdd-HHmmss>-<8 hex chars>`.
pub fn new_run_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().format("%Y%m%d-%H%M%S"), &random[..8])
}

/// The manifest a run was performed against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRef {
    pub path: String,
    pub name: String,
    /// `sha256:<hex>` of the manifest file bytes
    pub hash: String,
}

impl ManifestRef {
    pub fn from_resolved(manifest: &ResolvedManifest) -> Result<Self> {
        let hash = file_hash(Path::new(&manifest.path))?;
        Ok(Self {
            path: manifest.path.clone(),
            name: manifest.name.clone(),
            hash,
        })
    }
}

/// Outcome of one processed item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAction {
    /// Item category, e.g. `app`, `verify`, `restore`, `path`, `registry`
    pub kind: String,
    pub id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RunAction {
    pub fn new(kind: &str, id: impl Into<String>, status: impl ToString) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.into(),
            status: status.to_string(),
            driver: None,
            message: None,
        }
    }

    pub fn with_driver(mut self, driver: Option<&str>) -> Self {
        self.driver = driver.map(str::to_string);
        self
    }

    pub fn with_message(mut self, message: Option<&str>) -> Self {
        self.message = message.map(str::to_string);
        self
    }
}

/// Persisted record of a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub run_id: String,
    pub timestamp: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestRef>,
    pub success: bool,
    pub summary: BTreeMap<String, usize>,
    pub actions: Vec<RunAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl RunState {
    pub fn new(run_id: &str, command: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            timestamp: timestamp_now(),
            command: command.to_string(),
            manifest: None,
            success: true,
            summary: BTreeMap::new(),
            actions: Vec::new(),
            error: None,
        }
    }

    /// File name this record is stored under
    pub fn file_name(&self) -> String {
        format!("{}-{}.json", self.command, self.run_id)
    }

    pub(crate) fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
