//! Tests for source stores.

use omni_io::{FsSourceStore, IoError, MemorySourceStore, SourceStore, StoreError};
use omni_types::{ByteRange, FilePatch};

#[tokio::test]
async fn test_fs_store_patches_file() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("src")).expect("mkdir");
    std::fs::write(dir.path().join("src/App.tsx"), "<div>Hi</div>").expect("write");

    let store = FsSourceStore::new(dir.path());
    let patch = FilePatch::new("src/App.tsx", ByteRange::new(5, 7), "Hello");
    let written = store
        .write_patches("src/App.tsx", "<div>Hi</div>", &[patch])
        .await
        .expect("patch");

    assert_eq!(written, "<div>Hello</div>");
    assert_eq!(
        store.read_source("src/App.tsx").await.expect("read"),
        "<div>Hello</div>"
    );
}

#[tokio::test]
async fn test_fs_store_bad_patch_leaves_file() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("App.tsx"), "<a />").expect("write");

    let store = FsSourceStore::new(dir.path());
    let err = store
        .write_patches("App.tsx", "<a />", &[FilePatch::new("App.tsx", ByteRange::new(3, 40), "")])
        .await
        .expect_err("out of bounds");

    assert!(matches!(err, StoreError::Patch { .. }));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("App.tsx")).expect("read"),
        "<a />"
    );
}

#[tokio::test]
async fn test_fs_store_rejects_escaping_paths() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let store = FsSourceStore::new(dir.path());

    assert!(matches!(
        store.read_source("../secret.tsx").await,
        Err(StoreError::OutsideRoot(_))
    ));
    assert!(matches!(
        store.read_source("/etc/passwd").await,
        Err(StoreError::OutsideRoot(_))
    ));
    let inside = dir.path().join("App.tsx");
    assert_eq!(
        store.resolve(&inside.to_string_lossy()).expect("inside"),
        inside
    );
}

#[tokio::test]
async fn test_fs_store_size_limit() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("big.tsx"), "x".repeat(64)).expect("write");

    let store = FsSourceStore::new(dir.path()).with_max_file_size(16);
    let err = store.read_source("big.tsx").await.expect_err("too large");
    assert!(matches!(
        err,
        StoreError::Io {
            source: IoError::TooLarge(64, 16),
            ..
        }
    ));
}

#[tokio::test]
async fn test_memory_store_read_only() {
    let store = MemorySourceStore::new();
    store.insert("a.tsx", "<a />");
    store.set_read_only("a.tsx", true);

    let err = store
        .write_patches("a.tsx", "<a />", &[FilePatch::new("a.tsx", ByteRange::new(0, 0), "x")])
        .await
        .expect_err("read-only");
    assert!(matches!(err, StoreError::Rejected { .. }));
    assert_eq!(store.get("a.tsx").as_deref(), Some("<a />"));

    store.set_read_only("a.tsx", false);
    let written = store
        .write_patches("a.tsx", "<a />", &[FilePatch::new("a.tsx", ByteRange::new(0, 0), "x")])
        .await
        .expect("writable");
    assert_eq!(written, "x<a />");
}

#[tokio::test]
async fn test_memory_store_refuses_stale_base() {
    let store = MemorySourceStore::new();
    store.insert("a.tsx", "<a />");
    let insert = FilePatch::new("a.tsx", ByteRange::new(0, 0), "x");

    store
        .write_patches("a.tsx", "<a />", std::slice::from_ref(&insert))
        .await
        .expect("first writer");
    let err = store
        .write_patches("a.tsx", "<a />", &[insert])
        .await
        .expect_err("second writer planned on old content");

    assert!(matches!(err, StoreError::Conflict { .. }));
    assert_eq!(store.get("a.tsx").as_deref(), Some("x<a />"));
}

#[tokio::test]
async fn test_fs_store_refuses_stale_base() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("App.tsx"), "<a />").expect("write");
    let store = FsSourceStore::new(dir.path());

    std::fs::write(dir.path().join("App.tsx"), "<b />").expect("external edit");
    let err = store
        .write_patches("App.tsx", "<a />", &[FilePatch::new("App.tsx", ByteRange::new(0, 0), "x")])
        .await
        .expect_err("stale base");

    assert!(matches!(err, StoreError::Conflict { .. }));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("App.tsx")).expect("read"),
        "<b />"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fs_store_write_survives_dropped_caller() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("App.tsx"), "<a />").expect("write");
    let store = FsSourceStore::new(dir.path());
    let patch = FilePatch::new("App.tsx", ByteRange::new(0, 0), "x");

    // Abandon the first write as soon as it is polled once.
    let first = store.write_patches("App.tsx", "<a />", std::slice::from_ref(&patch));
    let _ = tokio::time::timeout(std::time::Duration::ZERO, first).await;

    // The abandoned write still lands, and the next one waits for it.
    let undo = FilePatch::new("App.tsx", ByteRange::new(0, 1), "");
    let written = store
        .write_patches("App.tsx", "x<a />", &[undo])
        .await
        .expect("second write sees the first");
    assert_eq!(written, "<a />");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("App.tsx")).expect("read"),
        "<a />"
    );
}

#[tokio::test]
async fn test_memory_store_missing_file() {
    let store = MemorySourceStore::new();
    assert!(matches!(
        store.read_source("nope.tsx").await,
        Err(StoreError::Io {
            source: IoError::NotFound(_),
            ..
        })
    ));
}
