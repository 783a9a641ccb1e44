//! Slash-normalized paths for profile and manifest locations

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path spelled with forward slashes, without doubled or trailing ones.
///
/// Manifest paths end up in run-state records and JSON envelopes, so they
/// are kept in one spelling regardless of how the caller typed them. A
/// leading `//` (UNC share) survives normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

fn normalize(raw: &str) -> String {
    let forward = raw.replace('\\', "/");
    let (prefix, rest) = match forward.strip_prefix("//") {
        Some(rest) => ("//", rest),
        None => ("", forward.as_str()),
    };

    let mut out = String::with_capacity(forward.len());
    out.push_str(prefix);
    let mut last_was_slash = false;
    for ch in rest.chars() {
        if ch == '/' && last_was_slash {
            continue;
        }
        last_was_slash = ch == '/';
        out.push(ch);
    }

    while out.len() > 1 && out.ends_with('/') && !out.ends_with(":/") && out != "//" {
        out.pop();
    }
    out
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: normalize(&path.as_ref().to_string_lossy()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Platform path for handing to `std::fs`
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Append a relative segment; the segment may itself contain separators.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() {
            return Self::new(segment);
        }
        let separator = if self.inner.ends_with('/') { "" } else { "/" };
        Self::new(format!("{}{}{}", self.inner, separator, segment))
    }

    pub fn parent(&self) -> Option<Self> {
        let idx = self.inner.rfind('/')?;
        let head = &self.inner[..idx];
        if head.is_empty() || head.ends_with(':') {
            // `/x` or `C:/x`: the parent keeps its root slash
            return Some(Self {
                inner: self.inner[..=idx].to_string(),
            });
        }
        Some(Self {
            inner: head.to_string(),
        })
    }

    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Name without its final extension; dotfiles are all stem.
    pub fn file_stem(&self) -> Option<&str> {
        self.split_name().map(|(stem, _)| stem)
    }

    pub fn extension(&self) -> Option<&str> {
        self.split_name().and_then(|(_, ext)| ext)
    }

    fn split_name(&self) -> Option<(&str, Option<&str>)> {
        let name = self.file_name()?;
        Some(match name.rfind('.') {
            Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
            _ => (name, None),
        })
    }

    pub fn exists(&self) -> bool {
        fs::metadata(&self.inner).is_ok()
    }

    pub fn is_dir(&self) -> bool {
        fs::metadata(&self.inner).is_ok_and(|m| m.is_dir())
    }

    pub fn is_file(&self) -> bool {
        fs::metadata(&self.inner).is_ok_and(|m| m.is_file())
    }

    /// Resolve symlinks and relative segments.
    ///
    /// Uses `dunce` so Windows paths come back without the `\\?\` prefix.
    pub fn canonicalize(&self) -> Result<Self> {
        dunce::canonicalize(&self.inner)
            .map(Self::new)
            .map_err(|e| Error::io(self.to_native(), e))
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}
