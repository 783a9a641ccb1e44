//! Manifest overlay model
//!
//! Profiles are JSONC manifests that may include other profiles. This module
//! locates them ([`ProfileStore`]), reads their local fields
//! ([`RawManifest`]), resolves inheritance into a [`ResolvedManifest`], and
//! edits local fields of writable profiles.

pub mod jsonc;
mod mutate;
pub mod profile;
pub mod resolver;
pub mod types;

pub use profile::{MANIFEST_FILE, ProfileFormat, ProfileLocation, ProfileStore, parse_raw};
pub use resolver::{ManifestResolver, read_raw};
pub use types::{AppEntry, RawManifest, ResolvedManifest, RestoreEntry, VerifyEntry};
