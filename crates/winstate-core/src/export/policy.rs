//! Sensitive-path policy
//!
//! Flags paths that commonly hold credentials or keys. A match never blocks
//! an export; it only produces a warning that callers surface separately.

use regex::{Regex, RegexBuilder};

use crate::{Error, Result};

/// Matched case-insensitively against the expanded path with `/` separators
const DEFAULT_PATTERNS: &[&str] = &[
    r"(^|/)\.ssh(/|$)",
    r"(^|/)\.aws(/|$)",
    r"(^|/)\.gnupg(/|$)",
    r"(^|/)\.kube/config$",
    r"(^|/)\.git-credentials$",
    r"(^|/)\.npmrc$",
    r"(^|/)id_(rsa|dsa|ecdsa|ed25519)",
    r"\.(pem|key|pfx|p12)$",
    r"credential",
    r"secret",
    r"token",
    r"/login data$",
    r"/cookies$",
];

#[derive(Debug, Clone)]
pub struct SensitivePathPolicy {
    patterns: Vec<Regex>,
}

impl SensitivePathPolicy {
    /// The built-in pattern set
    pub fn with_defaults() -> Result<Self> {
        Self::from_patterns(DEFAULT_PATTERNS.iter().copied())
    }

    /// Built-in patterns plus caller-supplied ones
    pub fn with_extra(extra: &[String]) -> Result<Self> {
        Self::from_patterns(
            DEFAULT_PATTERNS
                .iter()
                .copied()
                .chain(extra.iter().map(String::as_str)),
        )
    }

    fn from_patterns<'p>(patterns: impl Iterator<Item = &'p str>) -> Result<Self> {
        let patterns = patterns
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| Error::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Warnings for `path`; empty when nothing matches
    pub fn evaluate(&self, path: &str) -> Vec<String> {
        let normalized = path.replace('\\', "/");
        self.patterns
            .iter()
            .filter(|re| re.is_match(&normalized))
            .map(|re| format!("path matches sensitive pattern '{}'", re.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("C:\\Users\\me\\.ssh\\config")]
    #[case("C:/Users/me/.aws/credentials")]
    #[case("/home/me/.kube/config")]
    #[case("C:\\Users\\me\\AppData\\Local\\Google\\Chrome\\User Data\\Default\\Login Data")]
    #[case("C:\\certs\\server.PEM")]
    #[case("C:\\Users\\me\\AppData\\Roaming\\Microsoft\\Credentials")]
    fn flags_sensitive_paths(#[case] path: &str) {
        let policy = SensitivePathPolicy::with_defaults().unwrap();
        assert!(!policy.evaluate(path).is_empty(), "{path}");
    }

    #[rstest]
    #[case("C:\\Users\\me\\AppData\\Roaming\\Code\\User\\settings.json")]
    #[case("C:/Users/me/.gitconfig")]
    #[case("C:/Users/me/.sshd_notes.txt")]
    fn leaves_ordinary_paths_alone(#[case] path: &str) {
        let policy = SensitivePathPolicy::with_defaults().unwrap();
        assert!(policy.evaluate(path).is_empty(), "{path}");
    }

    #[test]
    fn extra_patterns_are_applied() {
        let policy = SensitivePathPolicy::with_extra(&["vault".to_string()]).unwrap();
        assert_eq!(policy.evaluate("D:/vault/notes.md").len(), 1);
    }

    #[test]
    fn invalid_extra_pattern_is_rejected() {
        let err = SensitivePathPolicy::with_extra(&["(".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
