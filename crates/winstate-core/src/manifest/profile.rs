//! Profile location and format classification
//!
//! A profile named `dev` can live in one of three shapes inside a profile
//! directory:
//!
//! | format   | on disk                         | writable |
//! |----------|---------------------------------|----------|
//! | `bare`   | `dev.jsonc`                     | yes      |
//! | `folder` | `dev/manifest.jsonc` (+ assets) | no       |
//! | `zip`    | `dev.zip` with `manifest.jsonc` | no       |
//!
//! Lookup probes the formats in that order and the first hit wins.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use winstate_fs::{NormalizedPath, io};

use super::jsonc;
use super::types::RawManifest;
use crate::{Error, Result};

/// Manifest file name inside folder and zip profiles
pub const MANIFEST_FILE: &str = "manifest.jsonc";

/// Extension of bare profile files
pub const BARE_EXTENSION: &str = "jsonc";

/// A profile name is a single directory entry under the store root.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', ':'])
}

/// Storage format of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileFormat {
    Bare,
    Folder,
    Zip,
}

impl ProfileFormat {
    /// Only bare profiles accept mutation
    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Bare)
    }
}

impl std::fmt::Display for ProfileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bare => write!(f, "bare"),
            Self::Folder => write!(f, "folder"),
            Self::Zip => write!(f, "zip"),
        }
    }
}

/// Where a profile lives and in which format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLocation {
    pub name: String,
    pub format: ProfileFormat,
    /// The bare file, folder, or archive
    pub path: NormalizedPath,
}

impl ProfileLocation {
    /// Classify an explicit path given on the command line or in `includes`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let path = NormalizedPath::new(path);
        if !path.exists() {
            return Err(Error::ManifestNotFound {
                path: path.to_native(),
            });
        }

        if path.is_dir() {
            let name = path.file_name().unwrap_or_default().to_string();
            return Ok(Self {
                name,
                format: ProfileFormat::Folder,
                path,
            });
        }

        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

        // `<profile>/manifest.jsonc` given directly still belongs to a folder profile
        if !is_zip
            && path.file_name() == Some(MANIFEST_FILE)
            && let Some(dir) = path.parent()
        {
            let name = dir.file_name().unwrap_or_default().to_string();
            return Ok(Self {
                name,
                format: ProfileFormat::Folder,
                path: dir,
            });
        }

        let name = path.file_stem().unwrap_or_default().to_string();
        let format = if is_zip {
            ProfileFormat::Zip
        } else {
            ProfileFormat::Bare
        };
        Ok(Self { name, format, path })
    }

    /// The manifest file itself (the archive, for zip profiles)
    pub fn manifest_path(&self) -> NormalizedPath {
        match self.format {
            ProfileFormat::Folder => self.path.join(MANIFEST_FILE),
            ProfileFormat::Bare | ProfileFormat::Zip => self.path.clone(),
        }
    }

    /// Directory holding this profile; sibling profiles are looked up here
    pub fn container_dir(&self) -> NormalizedPath {
        self.path
            .parent()
            .unwrap_or_else(|| NormalizedPath::new("."))
    }

    /// Root that restore `source` paths are relative to
    pub fn asset_root(&self) -> NormalizedPath {
        match self.format {
            ProfileFormat::Folder => self.path.clone(),
            ProfileFormat::Bare | ProfileFormat::Zip => self.container_dir(),
        }
    }

    /// Stable identity used for include-cycle detection
    pub fn identity(&self) -> String {
        self.path
            .canonicalize()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|_| self.path.as_str().to_string())
    }

    /// Read the manifest text, going through the archive for zip profiles.
    pub fn read_content(&self) -> Result<String> {
        match self.format {
            ProfileFormat::Bare | ProfileFormat::Folder => {
                let manifest = self.manifest_path();
                if !manifest.is_file() {
                    return Err(Error::ManifestNotFound {
                        path: manifest.to_native(),
                    });
                }
                Ok(io::read_text(&manifest)?)
            }
            ProfileFormat::Zip => read_archive_manifest(&self.path),
        }
    }

    /// Parse only the fields physically present in this profile's manifest.
    pub fn read_raw(&self) -> Result<RawManifest> {
        let content = self.read_content()?;
        parse_raw(&content, &self.manifest_path())
    }
}

fn read_archive_manifest(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    let archive_err = |message: String| Error::Archive {
        path: native.clone(),
        message,
    };

    let file = File::open(&native).map_err(|e| archive_err(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;
    let mut entry = archive
        .by_name(MANIFEST_FILE)
        .map_err(|e| archive_err(format!("{}: {}", MANIFEST_FILE, e)))?;

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| archive_err(e.to_string()))?;
    Ok(content)
}

/// Parse JSONC manifest content
pub fn parse_raw(content: &str, path: &NormalizedPath) -> Result<RawManifest> {
    let strict = jsonc::strip(content);
    serde_json::from_str(&strict).map_err(|e| Error::Parse {
        path: path.to_native(),
        message: e.to_string(),
    })
}

/// A directory of profiles
#[derive(Debug, Clone)]
pub struct ProfileStore {
    root: NormalizedPath,
}

impl ProfileStore {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Find a profile by name, probing bare, folder, then zip.
    ///
    /// Names that fail [`is_valid_name`] never resolve.
    pub fn resolve_profile(&self, name: &str) -> Option<ProfileLocation> {
        if !is_valid_name(name) {
            return None;
        }
        let bare = self.root.join(&format!("{}.{}", name, BARE_EXTENSION));
        if bare.is_file() {
            return Some(ProfileLocation {
                name: name.to_string(),
                format: ProfileFormat::Bare,
                path: bare,
            });
        }

        let folder = self.root.join(name);
        if folder.join(MANIFEST_FILE).is_file() {
            return Some(ProfileLocation {
                name: name.to_string(),
                format: ProfileFormat::Folder,
                path: folder,
            });
        }

        let archive = self.root.join(&format!("{}.zip", name));
        if archive.is_file() {
            return Some(ProfileLocation {
                name: name.to_string(),
                format: ProfileFormat::Zip,
                path: archive,
            });
        }

        None
    }

    /// Like [`resolve_profile`](Self::resolve_profile) but a miss is an error
    pub fn locate(&self, name: &str) -> Result<ProfileLocation> {
        self.resolve_profile(name)
            .ok_or_else(|| Error::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Every profile in the directory, sorted by name.
    ///
    /// When one name exists in several formats only the one that lookup
    /// would pick is listed.
    pub fn list(&self) -> Result<Vec<ProfileLocation>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(self.root.to_native())? {
            let entry = entry?;
            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy().to_string();

            let name = if path.is_dir() {
                path.join(MANIFEST_FILE).is_file().then_some(file_name)
            } else {
                file_name
                    .strip_suffix(&format!(".{}", BARE_EXTENSION))
                    .or_else(|| file_name.strip_suffix(".zip"))
                    .map(str::to_string)
            };

            if let Some(name) = name
                && !names.contains(&name)
            {
                names.push(name);
            }
        }

        names.sort();
        Ok(names
            .iter()
            .filter_map(|name| self.resolve_profile(name))
            .collect())
    }
}
