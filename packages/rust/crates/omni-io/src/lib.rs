#![allow(clippy::doc_markdown)]

//! omni-io - Source file access for Omni Canvas
//!
//! Reads sources strictly (no lossy decoding, since byte offsets computed on
//! the text are written back) and persists edits atomically.
//!
//! # Features
//!
//! - **Dual API**: Sync (std::fs) for settings and tooling, Async (tokio::fs) for the engine
//! - **Safety**: Binary detection, UTF-8 validation & size limits
//! - **Atomic writes**: temp file + fsync + rename
//! - **Stores**: `SourceStore` trait with filesystem and in-memory backends
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! omni-io/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # IoError / StoreError enums
//! ├── detect.rs   # Binary detection & strict decoding
//! ├── sync.rs     # Synchronous API
//! ├── async_io.rs # Asynchronous API (Tokio)
//! ├── dirs.rs     # PRJ_ROOT / PRJ_CONFIG_HOME resolution
//! └── store.rs    # SourceStore backends
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use omni_io::{FsSourceStore, SourceStore};
//!
//! let store = FsSourceStore::new("/work/app");
//! let source = store.read_source("src/App.tsx").await?;
//! let written = store.write_patches("src/App.tsx", &source, &patches).await?;
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod async_io;
mod detect;
mod dirs;
mod error;
mod store;
mod sync;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use async_io::{read_text_safe_async, write_text_atomic_async};
pub use dirs::{PrjDirs, anchor};
pub use error::{IoError, StoreError};
pub use store::{DEFAULT_MAX_FILE_SIZE, FsSourceStore, MemorySourceStore, SourceStore};
pub use sync::{read_text_safe, write_text_atomic};

// Re-export detection utilities for advanced use
pub use detect::{decode_buffer, is_binary};
