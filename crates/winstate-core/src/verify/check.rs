//! Typed verification checks
//!
//! Manifests store verify entries loosely; [`VerifyCheck::try_from`] turns
//! one into a closed variant, rejecting unknown types and missing parameters
//! up front. Running a check goes through a [`SystemProbe`] so the engine can
//! be exercised without touching the host.

use std::path::Path;
use std::process::Command;

use winstate_fs::expand_placeholders;

use crate::manifest::VerifyEntry;
use crate::{Error, Result};

/// Predicates the verifiers need from the host
pub trait SystemProbe {
    fn path_exists(&self, path: &Path) -> bool;

    /// Whether `command` resolves on the executable search path
    fn command_exists(&self, command: &str) -> bool;

    /// Whether registry key `key` exists and, when given, has value `value`
    fn registry_value_exists(&self, key: &str, value: Option<&str>) -> bool;
}

/// Result of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub success: bool,
    pub message: String,
}

impl CheckOutcome {
    fn new(success: bool, message: String) -> Self {
        Self { success, message }
    }
}

/// A verify entry with its type resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyCheck {
    FileExists { path: String },
    CommandExists { command: String },
    RegistryKeyExists { path: String, name: Option<String> },
}

impl VerifyCheck {
    pub const FILE_EXISTS: &'static str = "file-exists";
    pub const COMMAND_EXISTS: &'static str = "command-exists";
    pub const REGISTRY_KEY_EXISTS: &'static str = "registry-key-exists";

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::FileExists { .. } => Self::FILE_EXISTS,
            Self::CommandExists { .. } => Self::COMMAND_EXISTS,
            Self::RegistryKeyExists { .. } => Self::REGISTRY_KEY_EXISTS,
        }
    }

    /// Human-readable target of the check, used as the result id
    pub fn subject(&self) -> String {
        match self {
            Self::FileExists { path } => path.clone(),
            Self::CommandExists { command } => command.clone(),
            Self::RegistryKeyExists { path, name: None } => path.clone(),
            Self::RegistryKeyExists {
                path,
                name: Some(name),
            } => format!("{}\\{}", path, name),
        }
    }

    pub fn run(&self, probe: &dyn SystemProbe) -> CheckOutcome {
        match self {
            Self::FileExists { path } => {
                let expanded = expand_placeholders(path);
                if probe.path_exists(Path::new(&expanded)) {
                    CheckOutcome::new(true, format!("found: {}", expanded))
                } else {
                    CheckOutcome::new(false, format!("not found: {}", expanded))
                }
            }
            Self::CommandExists { command } => {
                if probe.command_exists(command) {
                    CheckOutcome::new(true, format!("command available: {}", command))
                } else {
                    CheckOutcome::new(false, format!("command not found: {}", command))
                }
            }
            Self::RegistryKeyExists { path, name } => {
                let subject = self.subject();
                if probe.registry_value_exists(path, name.as_deref()) {
                    CheckOutcome::new(true, format!("registry entry found: {}", subject))
                } else {
                    CheckOutcome::new(false, format!("registry entry not found: {}", subject))
                }
            }
        }
    }
}

impl TryFrom<&VerifyEntry> for VerifyCheck {
    type Error = Error;

    fn try_from(entry: &VerifyEntry) -> Result<Self> {
        let required = |type_name: &'static str, field: &'static str| {
            entry
                .param(field)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(Error::InvalidVerifyEntry { type_name, field })
        };

        match entry.type_name.as_str() {
            Self::FILE_EXISTS => Ok(Self::FileExists {
                path: required(Self::FILE_EXISTS, "path")?,
            }),
            Self::COMMAND_EXISTS => Ok(Self::CommandExists {
                command: required(Self::COMMAND_EXISTS, "command")?,
            }),
            Self::REGISTRY_KEY_EXISTS => Ok(Self::RegistryKeyExists {
                path: required(Self::REGISTRY_KEY_EXISTS, "path")?,
                name: entry.param("name").map(str::to_string),
            }),
            other => Err(Error::UnknownVerifyType {
                type_name: other.to_string(),
            }),
        }
    }
}

/// Probes the machine this process runs on
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe;

impl SystemProbe for HostProbe {
    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn command_exists(&self, command: &str) -> bool {
        which::which(command).is_ok()
    }

    fn registry_value_exists(&self, key: &str, value: Option<&str>) -> bool {
        let mut cmd = Command::new("reg");
        cmd.arg("query").arg(key);
        if let Some(value) = value {
            cmd.arg("/v").arg(value);
        }

        match cmd.output() {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!(key, error = %e, "reg query unavailable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(VerifyEntry::new("file-exists", &[("path", "C:/x")]), VerifyCheck::FileExists { path: "C:/x".into() })]
    #[case(VerifyEntry::new("command-exists", &[("command", "git")]), VerifyCheck::CommandExists { command: "git".into() })]
    #[case(
        VerifyEntry::new("registry-key-exists", &[("path", "HKCU\\Software\\X"), ("name", "Ver")]),
        VerifyCheck::RegistryKeyExists { path: "HKCU\\Software\\X".into(), name: Some("Ver".into()) }
    )]
    fn known_types_convert(#[case] entry: VerifyEntry, #[case] expected: VerifyCheck) {
        assert_eq!(VerifyCheck::try_from(&entry).unwrap(), expected);
    }

    #[test]
    fn unknown_type_is_a_typed_error() {
        let entry = VerifyEntry::new("service-running", &[("name", "x")]);
        let err = VerifyCheck::try_from(&entry).unwrap_err();
        assert_eq!(err.to_string(), "unknown verify type: service-running");
    }

    #[test]
    fn missing_parameter_is_rejected() {
        let entry = VerifyEntry::new("file-exists", &[]);
        let err = VerifyCheck::try_from(&entry).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidVerifyEntry {
                field: "path",
                ..
            }
        ));
    }

    #[test]
    fn registry_subject_includes_value_name() {
        let check = VerifyCheck::RegistryKeyExists {
            path: "HKLM\\Software\\Git".into(),
            name: Some("InstallPath".into()),
        };
        assert_eq!(check.subject(), "HKLM\\Software\\Git\\InstallPath");
    }
}
