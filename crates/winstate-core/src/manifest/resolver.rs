//! Include-chain resolution
//!
//! Turns a profile and everything it inherits into one [`ResolvedManifest`].
//!
//! Merge rules:
//!
//! - bases are resolved in `includes` order, each fully resolved first;
//! - apps are appended base-first then local, skipping any entry whose
//!   dedupe key was already seen (first occurrence wins);
//! - `exclude` and `excludeConfigs` are unioned across the whole chain and
//!   applied after merging, so an exclusion always beats an inclusion no
//!   matter where either is declared;
//! - `verify` and `restore` are concatenated base-first without
//!   de-duplication.
//!
//! Resolution only reads. Nothing in this module writes to a profile.

use std::collections::HashSet;
use std::path::Path;

use super::profile::{ProfileLocation, ProfileStore};
use super::types::{AppEntry, RawManifest, ResolvedManifest};
use crate::{Error, Result};

/// Resolves profiles for one target platform
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    platform: String,
}

/// A profile currently being resolved
struct Frame {
    identity: String,
    name: String,
}

/// Accumulates a merged view while walking the chain
#[derive(Default)]
struct Merged {
    apps: Vec<AppEntry>,
    seen_apps: HashSet<String>,
    verify: Vec<super::types::VerifyEntry>,
    restore: Vec<super::types::RestoreEntry>,
    config_modules: Vec<String>,
    exclude: Vec<String>,
    exclude_configs: Vec<String>,
    chain: Vec<String>,
}

impl Merged {
    fn push_app(&mut self, platform: &str, app: &AppEntry) {
        if self.seen_apps.insert(app.dedupe_key(platform).to_string()) {
            self.apps.push(app.clone());
        }
    }

    fn absorb(&mut self, platform: &str, base: ResolvedManifest) {
        for app in &base.apps {
            self.push_app(platform, app);
        }
        self.verify.extend(base.verify);
        self.restore.extend(base.restore);
        extend_unique(&mut self.config_modules, &base.config_modules);
        extend_unique(&mut self.exclude, &base.exclude);
        extend_unique(&mut self.exclude_configs, &base.exclude_configs);
        for link in base.chain {
            if !self.chain.contains(&link) {
                self.chain.push(link);
            }
        }
    }
}

fn extend_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

impl ManifestResolver {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }

    /// Resolve the manifest at `path` and everything it includes.
    ///
    /// # Errors
    ///
    /// `ManifestNotFound`/`ProfileNotFound` for a missing file or base,
    /// `Parse` for malformed content anywhere in the chain, and
    /// `CyclicInclude` when a base includes a profile already being
    /// resolved.
    pub fn read_resolved(&self, path: &Path) -> Result<ResolvedManifest> {
        let location = ProfileLocation::from_path(path)?;
        self.resolve_location(&location)
    }

    /// Resolve an already-located profile
    pub fn resolve_location(&self, location: &ProfileLocation) -> Result<ResolvedManifest> {
        let mut stack = Vec::new();
        self.resolve_inner(location, &mut stack)
    }

    fn resolve_inner(
        &self,
        location: &ProfileLocation,
        stack: &mut Vec<Frame>,
    ) -> Result<ResolvedManifest> {
        let identity = location.identity();
        if stack.iter().any(|frame| frame.identity == identity) {
            let mut chain: Vec<String> = stack.iter().map(|f| f.name.clone()).collect();
            chain.push(location.name.clone());
            return Err(Error::CyclicInclude { chain });
        }

        let raw = location.read_raw()?;
        tracing::debug!(
            profile = %location.name,
            format = %location.format,
            includes = raw.includes.as_ref().map_or(0, Vec::len),
            "Resolving profile"
        );

        stack.push(Frame {
            identity,
            name: location.name.clone(),
        });

        let mut merged = Merged::default();
        for include in raw.includes.iter().flatten() {
            let base_location = locate_include(location, include)?;
            let base = self.resolve_inner(&base_location, stack)?;
            merged.absorb(&self.platform, base);
        }

        stack.pop();

        Ok(self.finish(location, raw, merged))
    }

    fn finish(&self, location: &ProfileLocation, raw: RawManifest, mut merged: Merged) -> ResolvedManifest {
        let platform = self.platform.as_str();
        let local_app_count = raw.local_app_count();

        for app in raw.apps.iter().flatten() {
            merged.push_app(platform, app);
        }
        merged.verify.extend(raw.verify.into_iter().flatten());
        merged.restore.extend(raw.restore.into_iter().flatten());
        extend_unique(
            &mut merged.config_modules,
            raw.config_modules.as_deref().unwrap_or_default(),
        );
        extend_unique(&mut merged.exclude, raw.exclude.as_deref().unwrap_or_default());
        extend_unique(
            &mut merged.exclude_configs,
            raw.exclude_configs.as_deref().unwrap_or_default(),
        );

        let exclude = &merged.exclude;
        let before = merged.apps.len();
        merged
            .apps
            .retain(|app| !exclude.iter().any(|ex| app.matches_exclusion(platform, ex)));
        if merged.apps.len() != before {
            tracing::debug!(
                profile = %location.name,
                removed = before - merged.apps.len(),
                "Applied app exclusions"
            );
        }

        let exclude_configs = &merged.exclude_configs;
        merged
            .config_modules
            .retain(|module| !exclude_configs.contains(module));

        merged.chain.push(location.name.clone());

        ResolvedManifest {
            path: location.manifest_path().as_str().to_string(),
            name: raw.name.unwrap_or_else(|| location.name.clone()),
            version: raw.version.unwrap_or(1),
            apps: merged.apps,
            verify: merged.verify,
            restore: merged.restore,
            config_modules: merged.config_modules,
            includes: raw.includes.unwrap_or_default(),
            exclude: merged.exclude,
            exclude_configs: merged.exclude_configs,
            chain: merged.chain,
            local_app_count,
        }
    }
}

/// Read only the local fields of the manifest at `path`.
pub fn read_raw(path: &Path) -> Result<RawManifest> {
    ProfileLocation::from_path(path)?.read_raw()
}

/// Find an included base relative to the including profile.
///
/// Plain names are looked up as sibling profiles; values that look like a
/// path are taken relative to the including profile's directory.
fn locate_include(including: &ProfileLocation, include: &str) -> Result<ProfileLocation> {
    let container = including.container_dir();
    let looks_like_path = include.contains('/')
        || include.contains('\\')
        || include.ends_with(".jsonc")
        || include.ends_with(".json")
        || include.ends_with(".zip");

    if looks_like_path {
        let candidate = if Path::new(include).is_absolute() {
            winstate_fs::NormalizedPath::new(include)
        } else {
            container.join(include)
        };
        return ProfileLocation::from_path(&candidate.to_native()).map_err(|_| {
            Error::ProfileNotFound {
                name: include.to_string(),
            }
        });
    }

    ProfileStore::new(container).locate(include)
}
