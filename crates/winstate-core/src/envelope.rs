//! Machine-readable result envelope
//!
//! `--json` output of every command is one [`Envelope`]. Input errors that
//! stop an operation before it produces results still yield an envelope,
//! with `success: false` and an [`ErrorObject`] instead of raw error text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::ManifestRef;

/// Structured error carried in envelopes and run-state records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Stable machine code, e.g. `VERIFY_FAILED`
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub detail: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorObject {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            detail: Value::Null,
            remediation: None,
        }
    }

    /// Error object for an operation that could not run at all
    pub fn from_error(error: &crate::Error) -> Self {
        Self::new(error.code(), error.to_string())
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }
}

/// Top-level JSON result of one command
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<R: Serialize = Value> {
    pub success: bool,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestRef>,
    pub summary: BTreeMap<String, usize>,
    pub results: Vec<R>,
    pub run_id: String,
    pub state_file: Option<String>,
    pub log_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl<R: Serialize> Envelope<R> {
    pub fn new(command: &str, run_id: &str, results: Vec<R>) -> Self {
        Self {
            success: true,
            command: command.to_string(),
            manifest: None,
            summary: BTreeMap::new(),
            results,
            run_id: run_id.to_string(),
            state_file: None,
            log_file: None,
            events_file: None,
            error: None,
        }
    }
}

impl Envelope<Value> {
    /// Envelope for an operation that failed before producing results
    pub fn failure(command: &str, run_id: &str, error: ErrorObject) -> Self {
        let mut envelope = Self::new(command, run_id, Vec::new());
        envelope.success = false;
        envelope.error = Some(error);
        envelope
    }
}
