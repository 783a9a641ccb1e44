//! Filesystem primitives for winstate
//!
//! Provides normalized path handling, locked atomic writes, the copy helpers
//! used by the export engine, content hashes and environment placeholder
//! expansion for system paths declared in manifests.

pub mod checksum;
pub mod error;
pub mod expand;
pub mod io;
pub mod path;

pub use checksum::file_hash;
pub use error::{Error, Result};
pub use expand::{expand_placeholders, expand_with};
pub use path::NormalizedPath;
