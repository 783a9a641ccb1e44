//! Uninstall-registry detector
//!
//! Every program installed through Windows Installer or a classic setup
//! leaves a key under one of the `Uninstall` roots. Entries exposing a
//! `DisplayName` are matched against a fixed table of known families; the
//! first matching family names the finding and supplies the suggested
//! driver id. Entries matching no family are not reported.

use std::collections::HashSet;
use std::process::Command;

use regex::Regex;

use super::{DiscoveryEntry, DiscoveryMethod};
use crate::{Error, Result};

pub const UNINSTALL_ROOTS: &[&str] = &[
    r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    r"HKLM\SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
    r"HKCU\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
];

/// The values of one uninstall key that discovery uses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallEntry {
    pub key: String,
    pub display_name: Option<String>,
    pub display_version: Option<String>,
    pub publisher: Option<String>,
    pub install_location: Option<String>,
}

/// Where uninstall entries come from
pub trait UninstallSource {
    fn entries(&self) -> Result<Vec<UninstallEntry>>;
}

/// Reads uninstall keys with `reg query <root> /s`
#[derive(Debug, Clone, Copy, Default)]
pub struct RegQuerySource;

impl UninstallSource for RegQuerySource {
    fn entries(&self) -> Result<Vec<UninstallEntry>> {
        let mut entries = Vec::new();
        for root in UNINSTALL_ROOTS {
            let output = Command::new("reg")
                .args(["query", root, "/s"])
                .output()
                .map_err(|e| Error::Driver {
                    driver: "registry".to_string(),
                    message: format!("failed to run reg query: {}", e),
                })?;

            // A root that does not exist on this machine is not an error
            if !output.status.success() {
                tracing::debug!(root, status = %output.status, "Uninstall root unavailable");
                continue;
            }

            let parsed = parse_reg_query(&String::from_utf8_lossy(&output.stdout));
            tracing::debug!(root, count = parsed.len(), "Scanned uninstall root");
            entries.extend(parsed);
        }
        Ok(entries)
    }
}

/// Parse the text output of `reg query <key> /s`.
///
/// Key lines start with the hive name; value lines are indented and hold
/// name, type and data separated by runs of four spaces.
pub fn parse_reg_query(output: &str) -> Vec<UninstallEntry> {
    let mut entries = Vec::new();
    let mut current: Option<UninstallEntry> = None;

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.starts_with("HKEY_") {
            entries.extend(current.take());
            current = Some(UninstallEntry {
                key: line.to_string(),
                ..Default::default()
            });
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };
        let Some((name, data)) = split_value_line(line) else {
            continue;
        };
        let data = Some(data.to_string()).filter(|d| !d.is_empty());
        match name {
            "DisplayName" => entry.display_name = data,
            "DisplayVersion" => entry.display_version = data,
            "Publisher" => entry.publisher = data,
            "InstallLocation" => entry.install_location = data,
            _ => {}
        }
    }
    entries.extend(current);
    entries
}

/// `    Name    REG_SZ    Data` -> `("Name", "Data")`
fn split_value_line(line: &str) -> Option<(&str, &str)> {
    let body = line.strip_prefix("    ")?;
    let type_start = body.find("    REG_")?;
    let name = &body[..type_start];
    let rest = &body[type_start + 4..];
    let data = rest.split_once("    ").map_or("", |(_, data)| data);
    Some((name.trim(), data.trim()))
}

/// A known software family in the uninstall registry
struct Family {
    pattern: &'static str,
    name: &'static str,
    /// May reference capture groups as `$1`
    suggested_id: &'static str,
}

const FAMILIES: &[Family] = &[
    Family {
        pattern: r"^Git( version [\d.]+)?$",
        name: "git",
        suggested_id: "Git.Git",
    },
    Family {
        pattern: r"^Microsoft Visual Studio Code",
        name: "vscode",
        suggested_id: "Microsoft.VisualStudioCode",
    },
    Family {
        pattern: r"^Node\.?js",
        name: "node",
        suggested_id: "OpenJS.NodeJS",
    },
    Family {
        pattern: r"^Python 3\.(\d+)",
        name: "python",
        suggested_id: "Python.Python.3.$1",
    },
    Family {
        pattern: r"^7-Zip",
        name: "7zip",
        suggested_id: "7zip.7zip",
    },
    Family {
        pattern: r"^Docker Desktop",
        name: "docker",
        suggested_id: "Docker.DockerDesktop",
    },
    Family {
        pattern: r"^PowerShell 7",
        name: "pwsh",
        suggested_id: "Microsoft.PowerShell",
    },
    Family {
        pattern: r"^Mozilla Firefox",
        name: "firefox",
        suggested_id: "Mozilla.Firefox",
    },
    Family {
        pattern: r"^Google Chrome$",
        name: "chrome",
        suggested_id: "Google.Chrome",
    },
    Family {
        pattern: r"^Go Programming Language",
        name: "go",
        suggested_id: "GoLang.Go",
    },
    Family {
        pattern: r"^Notepad\+\+",
        name: "notepadplusplus",
        suggested_id: "Notepad++.Notepad++",
    },
    Family {
        pattern: r"^GitHub CLI",
        name: "gh",
        suggested_id: "GitHub.cli",
    },
];

/// Matches uninstall entries against the family table
pub struct RegistryDetector {
    families: Vec<(Regex, &'static Family)>,
}

impl std::fmt::Debug for RegistryDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryDetector")
            .field("families", &self.families.len())
            .finish()
    }
}

impl RegistryDetector {
    pub fn new() -> Result<Self> {
        let families = FAMILIES
            .iter()
            .map(|family| {
                Regex::new(&format!("(?i){}", family.pattern))
                    .map(|re| (re, family))
                    .map_err(|source| Error::InvalidPattern {
                        pattern: family.pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { families })
    }

    /// Findings for `entries`, one per distinct (DisplayName, DisplayVersion)
    pub fn detect(&self, entries: &[UninstallEntry]) -> Vec<DiscoveryEntry> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for entry in entries {
            let Some(display_name) = entry.display_name.as_deref() else {
                continue;
            };
            let version = entry.display_version.clone().unwrap_or_default();
            if !seen.insert((display_name.to_string(), version)) {
                continue;
            }

            let Some((name, suggested_id)) = self.classify(display_name) else {
                tracing::trace!(display_name, "No known family");
                continue;
            };

            let mut discovery = DiscoveryEntry::new(name, DiscoveryMethod::Registry);
            discovery.display_name = Some(display_name.to_string());
            discovery.display_version = entry.display_version.clone();
            discovery.publisher = entry.publisher.clone();
            discovery.install_location = entry.install_location.clone();
            discovery.suggested_driver_id = Some(suggested_id);
            found.push(discovery);
        }

        found
    }

    /// First matching family's name and expanded suggested id
    fn classify(&self, display_name: &str) -> Option<(&'static str, String)> {
        self.families.iter().find_map(|(re, family)| {
            let caps = re.captures(display_name)?;
            let mut suggested = String::new();
            caps.expand(family.suggested_id, &mut suggested);
            Some((family.name, suggested))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const OUTPUT: &str = "\r
HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\Git_is1\r
    Inno Setup: Setup Version    REG_SZ    6.2.2\r
    DisplayName    REG_SZ    Git\r
    DisplayVersion    REG_SZ    2.43.0\r
    Publisher    REG_SZ    The Git Development Community\r
    InstallLocation    REG_SZ    C:\\Program Files\\Git\\\r
    NoModify    REG_DWORD    0x1\r
\r
HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\Empty\r
    (Default)    REG_SZ\r
";

    #[test]
    fn parses_keys_and_values() {
        let entries = parse_reg_query(OUTPUT);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].display_name.as_deref(), Some("Git"));
        assert_eq!(entries[0].display_version.as_deref(), Some("2.43.0"));
        assert_eq!(
            entries[0].install_location.as_deref(),
            Some("C:\\Program Files\\Git\\")
        );
        assert_eq!(entries[1].display_name, None);
    }

    #[test]
    fn python_suggestion_carries_minor_version() {
        let detector = RegistryDetector::new().unwrap();
        assert_eq!(
            detector.classify("Python 3.12.1 (64-bit)"),
            Some(("python", "Python.Python.3.12".to_string()))
        );
    }

    #[test]
    fn first_family_wins_and_unknown_is_dropped() {
        let detector = RegistryDetector::new().unwrap();
        assert_eq!(
            detector.classify("Git"),
            Some(("git", "Git.Git".to_string()))
        );
        assert_eq!(detector.classify("GitHub CLI").map(|(n, _)| n), Some("gh"));
        assert_eq!(detector.classify("Contoso Widget"), None);
    }
}
