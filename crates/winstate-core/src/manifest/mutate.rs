//! Local-field mutation of bare profiles
//!
//! Every operation here is a read-modify-write of one [`RawManifest`]. The
//! resolved view is never involved, so inherited apps are never copied into
//! the file being edited. Writes go through
//! [`write_atomic`](winstate_fs::io::write_atomic) and only happen when the
//! file actually changes.

use winstate_fs::{NormalizedPath, io};

use super::profile::{BARE_EXTENSION, ProfileLocation, ProfileStore, is_valid_name};
use super::types::{AppEntry, RawManifest};
use crate::{Error, Result};

impl ProfileStore {
    /// Append apps for the given driver-native ids to a bare profile.
    ///
    /// Returns how many entries were genuinely new. Ids already declared
    /// locally, or repeated within `native_ids`, are counted once.
    pub fn add_app(&self, name: &str, platform: &str, native_ids: &[String]) -> Result<usize> {
        self.edit_bare(name, |raw| {
            let apps = raw.apps.get_or_insert_with(Vec::new);
            let mut added = 0;
            for native in native_ids {
                if apps.iter().any(|app| app.dedupe_key(platform) == native) {
                    continue;
                }
                apps.push(AppEntry::from_native_id(platform, native));
                added += 1;
            }
            added
        })
    }

    /// Add app ids to the profile's local `exclude` list.
    pub fn add_exclusion(&self, name: &str, ids: &[String]) -> Result<usize> {
        self.edit_bare(name, |raw| {
            push_unique(raw.exclude.get_or_insert_with(Vec::new), ids)
        })
    }

    /// Add config-module ids to the profile's local `excludeConfigs` list.
    pub fn add_exclude_config(&self, name: &str, modules: &[String]) -> Result<usize> {
        self.edit_bare(name, |raw| {
            push_unique(raw.exclude_configs.get_or_insert_with(Vec::new), modules)
        })
    }

    /// Create a new bare profile that only includes `includes`.
    ///
    /// # Errors
    ///
    /// `InvalidProfileName` if `name` is not a plain file name, and
    /// `ProfileExists` if a profile of that name exists in any format.
    pub fn new_overlay(&self, name: &str, includes: &[String]) -> Result<ProfileLocation> {
        if !is_valid_name(name) {
            return Err(Error::InvalidProfileName {
                name: name.to_string(),
            });
        }
        if let Some(existing) = self.resolve_profile(name) {
            tracing::debug!(profile = %name, format = %existing.format, "Overlay target exists");
            return Err(Error::ProfileExists {
                name: name.to_string(),
            });
        }

        let raw = RawManifest {
            version: Some(1),
            name: Some(name.to_string()),
            includes: Some(includes.to_vec()),
            ..Default::default()
        };

        let path = self.root().join(&format!("{}.{}", name, BARE_EXTENSION));
        write_raw(&path, &raw)?;
        tracing::info!(profile = %name, includes = includes.len(), "Created overlay profile");

        ProfileLocation::from_path(&path.to_native())
    }

    fn edit_bare<F>(&self, name: &str, edit: F) -> Result<usize>
    where
        F: FnOnce(&mut RawManifest) -> usize,
    {
        let location = self.locate(name)?;
        if !location.format.is_mutable() {
            return Err(Error::ProfileNotMutable {
                name: name.to_string(),
                format: location.format,
            });
        }

        let mut raw = location.read_raw()?;
        let before = raw.clone();
        let changed = edit(&mut raw);

        if raw != before {
            write_raw(&location.path, &raw)?;
            tracing::debug!(profile = %name, changed, "Updated bare profile");
        }

        Ok(changed)
    }
}

fn push_unique(list: &mut Vec<String>, items: &[String]) -> usize {
    let mut added = 0;
    for item in items {
        if !list.contains(item) {
            list.push(item.clone());
            added += 1;
        }
    }
    added
}

// Comments in the original file are not preserved.
fn write_raw(path: &NormalizedPath, raw: &RawManifest) -> Result<()> {
    let mut content = serde_json::to_string_pretty(raw)?;
    content.push('\n');
    io::write_atomic(path, content.as_bytes())?;
    Ok(())
}
