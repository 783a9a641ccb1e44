//! Atomic writes with locking, and the copy primitives used by export

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;
use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partial file.
/// The advisory lock only serializes writers that go through this function;
/// two processes doing read-modify-write on the same file still race and the
/// later rename wins.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let target = path.to_native();
    ensure_parent(&target)?;

    // Same directory as the target so the rename never crosses filesystems
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = target.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

    let written = write_locked(&temp_path, &target, content)
        .and_then(|()| fs::rename(&temp_path, &target).map_err(|e| Error::io(&target, e)));
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn write_locked(temp_path: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    let lock_failed = |_: std::io::Error| Error::LockFailed {
        path: target.to_path_buf(),
    };
    file.lock_exclusive().map_err(lock_failed)?;
    file.write_all(content).map_err(|e| Error::io(temp_path, e))?;
    file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    file.unlock().map_err(lock_failed)
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Write a file that must not exist yet.
///
/// Used for records that are immutable once written; an existing file is
/// reported as [`Error::AlreadyExists`] rather than overwritten.
pub fn write_new(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent(path)?;

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(Error::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    file.write_all(content).map_err(|e| Error::io(path, e))?;
    file.sync_all().map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Copy a single file, creating the destination's parent directories.
///
/// An existing destination file is overwritten in place.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64> {
    ensure_parent(dest)?;
    fs::copy(source, dest).map_err(|e| Error::io(source, e))
}

/// Replace `dest` with a recursive copy of the `source` directory.
///
/// Any existing destination directory is deleted first, so the result
/// mirrors `source` exactly instead of merging into stale content.
/// Returns the number of files copied.
pub fn replace_dir(source: &Path, dest: &Path) -> Result<u64> {
    if dest.exists() {
        tracing::debug!(dest = %dest.display(), "Removing existing destination directory");
        fs::remove_dir_all(dest).map_err(|e| Error::io(dest, e))?;
    }
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

    let mut copied = 0;
    for entry in WalkDir::new(source).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| Error::Walk {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::Walk {
                path: entry.path().to_path_buf(),
                message: e.to_string(),
            })?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::io(entry.path(), e))?;
            copied += 1;
        }
    }

    Ok(copied)
}
