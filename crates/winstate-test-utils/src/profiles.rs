//! [`TestProfiles`] builder for overlay, verify and export scenarios.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Build a manifest value with the given includes and `windows` app refs.
///
/// App logical ids are the lower-cased native ids.
pub fn manifest(name: &str, includes: &[&str], native_ids: &[&str]) -> Value {
    let apps: Vec<Value> = native_ids
        .iter()
        .map(|id| json!({"id": id.to_lowercase(), "refs": {"windows": id}}))
        .collect();

    let mut value = json!({"version": 1, "name": name, "apps": apps});
    if !includes.is_empty() {
        value["includes"] = json!(includes);
    }
    value
}

/// A temporary directory laid out as:
///
/// ```text
/// <tmp>/profiles/   profile files
/// <tmp>/system/     stand-in for live system paths
/// <tmp>/state/      run-state records
/// ```
pub struct TestProfiles {
    temp_dir: TempDir,
}

impl Default for TestProfiles {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProfiles {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["profiles", "system", "state"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root().join("profiles")
    }

    pub fn system_dir(&self) -> PathBuf {
        self.root().join("system")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root().join("state")
    }

    /// Write `<profiles>/<name>.jsonc` from a JSON value.
    pub fn write_bare(&self, name: &str, manifest: &Value) -> PathBuf {
        self.write_bare_text(name, &pretty(manifest))
    }

    /// Write `<profiles>/<name>.jsonc` verbatim, e.g. with comments.
    pub fn write_bare_text(&self, name: &str, content: &str) -> PathBuf {
        let path = self.profiles_dir().join(format!("{}.jsonc", name));
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `<profiles>/<name>/manifest.jsonc` and return the folder.
    pub fn write_folder(&self, name: &str, manifest: &Value) -> PathBuf {
        let dir = self.profiles_dir().join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("manifest.jsonc"), pretty(manifest)).unwrap();
        dir
    }

    /// Write `<profiles>/<name>.zip` holding `manifest.jsonc`.
    pub fn write_zip(&self, name: &str, manifest: &Value) -> PathBuf {
        let path = self.profiles_dir().join(format!("{}.zip", name));
        let file = fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("manifest.jsonc", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(pretty(manifest).as_bytes()).unwrap();
        writer.finish().unwrap();
        path
    }

    /// Write a file under the scratch system area.
    pub fn write_system_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.system_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Read any file under the fixture root.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap()
    }

    /// Read a bare profile's raw text.
    pub fn read_bare(&self, name: &str) -> String {
        self.read(&format!("profiles/{}.jsonc", name))
    }

    /// Parse a bare profile's text as strict JSON.
    pub fn read_bare_json(&self, name: &str) -> Value {
        serde_json::from_str(&self.read_bare(name)).unwrap()
    }

    pub fn assert_file_exists(&self, relative: &str) {
        let path = self.root().join(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    pub fn assert_file_not_exists(&self, relative: &str) {
        let path = self.root().join(relative);
        assert!(!path.exists(), "Expected file NOT to exist: {}", path.display());
    }

    /// Recursively list every file below `relative`, sorted.
    pub fn files_under(&self, relative: &str) -> Vec<PathBuf> {
        let mut files = Vec::new();
        collect_files(&self.root().join(relative), &mut files);
        files.sort();
        files
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap()
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out);
        } else {
            out.push(path);
        }
    }
}
