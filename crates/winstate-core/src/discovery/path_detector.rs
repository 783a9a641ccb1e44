//! Well-known commands on the executable search path

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{DiscoveryEntry, DiscoveryMethod};

/// A command worth looking for and the package that usually provides it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownTool {
    pub name: &'static str,
    pub command: &'static str,
    pub suggested_id: &'static str,
}

const fn tool(name: &'static str, command: &'static str, suggested_id: &'static str) -> KnownTool {
    KnownTool {
        name,
        command,
        suggested_id,
    }
}

pub const KNOWN_TOOLS: &[KnownTool] = &[
    tool("git", "git", "Git.Git"),
    tool("node", "node", "OpenJS.NodeJS"),
    tool("python", "python", "Python.Python.3"),
    tool("vscode", "code", "Microsoft.VisualStudioCode"),
    tool("pwsh", "pwsh", "Microsoft.PowerShell"),
    tool("docker", "docker", "Docker.DockerDesktop"),
    tool("go", "go", "GoLang.Go"),
    tool("rustup", "rustup", "Rustlang.Rustup"),
    tool("gh", "gh", "GitHub.cli"),
    tool("7zip", "7z", "7zip.7zip"),
    tool("dotnet", "dotnet", "Microsoft.DotNet.SDK.8"),
    tool("kubectl", "kubectl", "Kubernetes.kubectl"),
    tool("terraform", "terraform", "Hashicorp.Terraform"),
];

/// Host queries the PATH detector needs
pub trait CommandProbe {
    /// Full path of `command` if it resolves on `PATH`
    fn resolve(&self, command: &str) -> Option<PathBuf>;

    /// Raw output of `<path> --version`, if the command produced any
    fn version_output(&self, path: &Path) -> Option<String>;
}

/// Resolves commands with `which` and runs them for their version
#[derive(Debug, Clone, Copy, Default)]
pub struct HostCommandProbe;

impl CommandProbe for HostCommandProbe {
    fn resolve(&self, command: &str) -> Option<PathBuf> {
        which::which(command).ok()
    }

    /// Output of `--version`; a non-zero exit means the flag was rejected.
    fn version_output(&self, path: &Path) -> Option<String> {
        let output = Command::new(path).arg("--version").output().ok()?;
        if !output.status.success() {
            tracing::debug!(path = %path.display(), status = %output.status, "Version probe failed");
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            Some(String::from_utf8_lossy(&output.stderr).to_string())
        } else {
            Some(stdout.to_string())
        }
    }
}

/// One entry per known tool that resolves on `PATH`.
pub fn detect_path_tools(probe: &dyn CommandProbe) -> Vec<DiscoveryEntry> {
    KNOWN_TOOLS
        .iter()
        .filter_map(|tool| {
            let path = probe.resolve(tool.command)?;
            let version = probe
                .version_output(&path)
                .as_deref()
                .and_then(|out| out.lines().map(str::trim).find(|line| !line.is_empty()))
                .unwrap_or_default()
                .to_string();
            tracing::debug!(tool = tool.name, path = %path.display(), %version, "Found tool on PATH");

            let mut entry = DiscoveryEntry::new(tool.name, DiscoveryMethod::Path);
            entry.path = Some(path.display().to_string().replace('\\', "/"));
            entry.version = Some(version);
            entry.suggested_driver_id = Some(tool.suggested_id.to_string());
            Some(entry)
        })
        .collect()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn rejected_version_flag_yields_no_version() {
        let dir = tempfile::tempdir().unwrap();
        let go = script(
            dir.path(),
            "go",
            "echo 'flag provided but not defined: -version' >&2\nexit 2",
        );

        assert_eq!(HostCommandProbe.version_output(&go), None);
    }

    #[test]
    fn version_on_stderr_is_accepted_when_the_command_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "tool", "echo 'tool 1.2.3' >&2");

        assert_eq!(HostCommandProbe.version_output(&tool).as_deref(), Some("tool 1.2.3\n"));
    }
}
