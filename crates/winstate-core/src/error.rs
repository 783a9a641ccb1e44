//! Error types for winstate-core
//!
//! Only input and configuration problems surface as [`Error`]. Failures of a
//! single verify, export or discovery item are recorded in that operation's
//! results and never reach this type.

use std::path::PathBuf;

use crate::manifest::ProfileFormat;

/// Result type for winstate-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in winstate-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No manifest file at the given path
    #[error("Manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// No profile of that name in any supported format
    #[error("Profile not found: {name}")]
    ProfileNotFound { name: String },

    /// Manifest content could not be parsed
    #[error("Failed to parse manifest {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// An include chain revisits a profile already being resolved
    #[error("Cyclic include detected: {}", chain.join(" -> "))]
    CyclicInclude { chain: Vec<String> },

    /// Mutation attempted on a folder or archive profile
    #[error("Profile '{name}' is a {format} profile and cannot be modified; only bare profiles are writable")]
    ProfileNotMutable { name: String, format: ProfileFormat },

    /// `new_overlay` target name is already taken
    #[error("Profile already exists: {name}")]
    ProfileExists { name: String },

    /// Name would place the profile outside the profiles directory
    #[error("Invalid profile name '{name}': names cannot contain path separators or '..'")]
    InvalidProfileName { name: String },

    /// Profile archive is unreadable or lacks a manifest
    #[error("Failed to read profile archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// Verify entry carries a `type` with no matching verifier
    #[error("unknown verify type: {type_name}")]
    UnknownVerifyType { type_name: String },

    /// Verify entry of a known type lacks a required parameter
    #[error("invalid {type_name} entry: missing '{field}'")]
    InvalidVerifyEntry {
        type_name: &'static str,
        field: &'static str,
    },

    /// The package driver could not be queried at all
    #[error("Driver '{driver}' failed: {message}")]
    Driver { driver: String, message: String },

    /// A pattern in the sensitive-path policy does not compile
    #[error("Invalid sensitive path pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Settings file could not be parsed
    #[error("Invalid settings file {path}: {message}")]
    Settings { path: PathBuf, message: String },

    /// Run record not found in the state directory
    #[error("Run not found: {id}")]
    RunNotFound { id: String },

    /// Filesystem error from winstate-fs
    #[error(transparent)]
    Fs(#[from] winstate_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable machine-readable code for JSON envelopes
    pub fn code(&self) -> &'static str {
        match self {
            Self::ManifestNotFound { .. } => "MANIFEST_NOT_FOUND",
            Self::ProfileNotFound { .. } => "PROFILE_NOT_FOUND",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::CyclicInclude { .. } => "CYCLIC_INCLUDE",
            Self::ProfileNotMutable { .. } => "PROFILE_NOT_MUTABLE",
            Self::ProfileExists { .. } => "PROFILE_EXISTS",
            Self::InvalidProfileName { .. } => "INVALID_PROFILE_NAME",
            Self::Archive { .. } => "ARCHIVE_ERROR",
            Self::UnknownVerifyType { .. } | Self::InvalidVerifyEntry { .. } => "INVALID_VERIFY_ENTRY",
            Self::Driver { .. } => "DRIVER_ERROR",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::Settings { .. } => "INVALID_SETTINGS",
            Self::RunNotFound { .. } => "RUN_NOT_FOUND",
            Self::Fs(_) | Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "SERIALIZATION_ERROR",
        }
    }
}
