//! File hashes in `sha256:<hex>` form
//!
//! Run-state records pin the manifest they ran against by hash. Profiles can
//! be archives of arbitrary size, so files are streamed through the hasher
//! rather than read whole.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::{Error, Result};

const PREFIX: &str = "sha256:";

/// Hash of the file at `path`, streamed in buffered chunks.
pub fn file_hash(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(|e| Error::io(path, e))?;
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_has_known_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonc");
        std::fs::write(&path, b"").unwrap();

        assert_eq!(
            file_hash(&path).unwrap(),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn streamed_file_matches_one_shot_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.zip");
        let bytes: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &bytes).unwrap();

        let expected = format!("{}{:x}", PREFIX, Sha256::digest(&bytes));
        assert_eq!(file_hash(&path).unwrap(), expected);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.jsonc");
        let err = file_hash(&path).unwrap_err();
        assert!(err.to_string().contains("gone.jsonc"), "{err}");
    }
}
