#![allow(clippy::doc_markdown)]

//! omni-engine - Visual edit orchestration for Omni Canvas
//!
//! Turns visual edit actions (restyle, insert, remove, move, retext) and
//! drift-tolerant code edits into minimal source patches, with per-surface
//! undo/redo.
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! omni-engine/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # EngineError enum
//! ├── action.rs   # Action union and targets
//! ├── log.rs      # Bounded undo/redo stacks
//! ├── settings.rs # Layered YAML settings → EngineConfig
//! └── engine.rs   # Resolve → mutate → patch → log pipeline
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use omni_engine::{Action, ActionEngine, Target, load_engine_config};
//!
//! let engine = ActionEngine::for_project(root, index, load_engine_config());
//! engine.apply(Action::RemoveElement { target: Target::new("preview", "#banner"), location: None }).await?;
//! engine.undo("preview").await?;
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod action;
mod engine;
mod error;
mod log;
pub mod settings;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use action::{Action, Target};
pub use engine::{ActionEngine, ApplyResult, Phase};
pub use error::EngineError;
pub use log::{CommandLog, CommandLogEntry, HistoryDepth};
pub use settings::{EngineConfig, load_engine_config};
