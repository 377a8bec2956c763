use std::fs;

use gallery_engine::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("2001");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn rejects_file_in_place_of_directory() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("2001");
    fs::write(&path, "x").unwrap();
    assert!(ensure_output_dir(&path).is_err());
}

#[test]
fn atomic_write_replaces_existing_and_is_atomic() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("a301.jpg", b"hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "a301.jpg");
    assert_eq!(fs::read(&first).unwrap(), b"hello");

    // Replace existing
    let second = writer.write("a301.jpg", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"world");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("a301.jpg", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("a301.jpg").exists());
}
