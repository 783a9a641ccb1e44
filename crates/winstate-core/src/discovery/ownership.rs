//! Ownership cross-check
//!
//! Decides whether a discovery is already managed by the package driver.
//! The match is deliberately loose: calling something owned when it is
//! only the same id family is preferred to suggesting a redundant install.

use super::DiscoveryEntry;

/// Whether `suggested` is covered by any of `installed`.
///
/// Comparison is case-insensitive. An installed id covers a suggestion
/// when they are equal, when either is a dotted-prefix child of the other
/// (`Python.Python.3` covers `Python.Python.3.12`), or when the first two
/// dot segments of the suggestion equal the installed id.
pub fn is_owned(suggested: &str, installed: &[String]) -> bool {
    let suggested = suggested.to_lowercase();
    let family: String = suggested.split('.').take(2).collect::<Vec<_>>().join(".");

    installed.iter().any(|id| {
        let id = id.to_lowercase();
        id == suggested
            || id.starts_with(&format!("{}.", suggested))
            || suggested.starts_with(&format!("{}.", id))
            || family == id
    })
}

/// Set `owned_by_driver` on every entry with a suggested id
pub fn mark_ownership(entries: &mut [DiscoveryEntry], installed: &[String]) {
    for entry in entries.iter_mut() {
        entry.owned_by_driver = entry
            .suggested_driver_id
            .as_deref()
            .is_some_and(|id| is_owned(id, installed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::DiscoveryMethod;
    use rstest::rstest;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("Git.Git", &["Git.Git"], true)]
    #[case("git.git", &["Git.Git"], true)]
    #[case("Python.Python.3.12", &["Python.Python.3"], true)]
    #[case("Python.Python", &["Python.Python.3.12"], true)]
    #[case("Microsoft.DotNet.SDK.8", &["Microsoft.DotNet"], true)]
    #[case("Microsoft.PowerShell", &["Docker.DockerDesktop"], false)]
    #[case("Git.Git", &["Git.GitLFS"], false)]
    #[case("Git.Git", &[], false)]
    fn ownership_cases(#[case] suggested: &str, #[case] installed: &[&str], #[case] owned: bool) {
        assert_eq!(is_owned(suggested, &ids(installed)), owned);
    }

    #[test]
    fn entries_without_suggestion_are_never_owned() {
        let mut entries = vec![DiscoveryEntry::new("tool", DiscoveryMethod::Path)];
        mark_ownership(&mut entries, &ids(&["tool"]));
        assert!(!entries[0].owned_by_driver);
    }
}
