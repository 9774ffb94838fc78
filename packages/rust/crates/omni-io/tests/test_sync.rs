//! Tests for sync module - synchronous file operations.

use std::io::Write;
use tempfile::TempDir;

use omni_io::{IoError, read_text_safe, write_text_atomic};

#[test]
fn test_sync_read() {
    let dir = TempDir::new().expect("tempdir");
    let p = dir.path().join("App.tsx");
    std::fs::write(&p, "export default 1;").expect("write");
    assert_eq!(read_text_safe(&p, 1024).expect("read"), "export default 1;");
}

#[test]
fn test_sync_binary() {
    let dir = TempDir::new().expect("tempdir");
    let p = dir.path().join("binary.bin");
    let mut file = std::fs::File::create(&p).expect("create");
    file.write_all(b"\x00\x01\x02\x03").expect("write");
    assert!(matches!(read_text_safe(&p, 1024), Err(IoError::BinaryFile)));
}

#[test]
fn test_sync_invalid_utf8() {
    let dir = TempDir::new().expect("tempdir");
    let p = dir.path().join("latin1.tsx");
    std::fs::write(&p, [0x48, 0x65, 0x6c, 0xff, 0x6f]).expect("write");
    assert!(matches!(read_text_safe(&p, 1024), Err(IoError::Encoding(3))));
}

#[test]
fn test_file_too_large() {
    let dir = TempDir::new().expect("tempdir");
    let p = dir.path().join("large.tsx");
    std::fs::write(&p, "12345678901234567890").expect("write");
    assert!(matches!(read_text_safe(&p, 10), Err(IoError::TooLarge(20, 10))));
}

#[test]
fn test_file_not_found() {
    let result = read_text_safe("/nonexistent/file.tsx", 1024);
    assert!(matches!(result, Err(IoError::NotFound(_))));
}

#[test]
fn test_atomic_write_creates_parents_and_leaves_no_temp() {
    let dir = TempDir::new().expect("tempdir");
    let p = dir.path().join("src/components/Card.tsx");
    write_text_atomic(&p, "a").expect("first write");
    write_text_atomic(&p, "b").expect("second write");
    assert_eq!(std::fs::read_to_string(&p).expect("read"), "b");
    let entries = std::fs::read_dir(p.parent().expect("parent")).expect("dir").count();
    assert_eq!(entries, 1);
}
