use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use winstate_fs::{Error, NormalizedPath, io};

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("nested/dir/dev.jsonc"));

    io::write_atomic(&path, b"{}").unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "{}");
}

#[test]
fn test_write_atomic_overwrites_and_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("dev.jsonc");
    fs::write(&file_path, "original").unwrap();

    io::write_atomic(&NormalizedPath::new(&file_path), b"updated").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp file left behind: {:?}", leftovers);
}

#[test]
fn test_write_new_refuses_existing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state/verify-1.json");

    io::write_new(&path, b"first").unwrap();
    let err = io::write_new(&path, b"second").unwrap_err();

    assert!(matches!(err, Error::AlreadyExists { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "first");
}

#[test]
fn test_read_text_nonexistent_file() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("missing.jsonc"));
    assert!(matches!(io::read_text(&path), Err(Error::Io { .. })));
}

#[test]
fn test_copy_file_creates_parents_and_overwrites() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("settings.json");
    fs::write(&source, "new").unwrap();

    let dest = temp.path().join("export/configs/vscode/settings.json");
    io::copy_file(&source, &dest).unwrap();
    assert_eq!(fs::read_to_string(&dest).unwrap(), "new");

    fs::write(&source, "newer").unwrap();
    io::copy_file(&source, &dest).unwrap();
    assert_eq!(fs::read_to_string(&dest).unwrap(), "newer");
}

#[test]
fn test_replace_dir_removes_stale_destination_content() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    fs::create_dir_all(source.join("snippets")).unwrap();
    fs::write(source.join("settings.json"), "{}").unwrap();
    fs::write(source.join("snippets/rust.json"), "[]").unwrap();

    let dest = temp.path().join("dest");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("stale.json"), "old").unwrap();

    let copied = io::replace_dir(&source, &dest).unwrap();

    assert_eq!(copied, 2);
    assert!(dest.join("settings.json").is_file());
    assert!(dest.join("snippets/rust.json").is_file());
    assert!(!dest.join("stale.json").exists());
}

#[test]
fn test_replace_dir_missing_source_is_an_error() {
    let temp = TempDir::new().unwrap();
    let result = io::replace_dir(&temp.path().join("nope"), &temp.path().join("dest"));
    assert!(result.is_err());
}
