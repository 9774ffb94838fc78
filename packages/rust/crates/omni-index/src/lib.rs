//! omni-index - Live element index of rendered surfaces
//!
//! Mirrors what the rendering host shows: one node forest per surface,
//! runtime-id lookup, incremental deltas, and selector resolution down to the
//! source location each node was rendered from.
//!
//! ## Architecture
//!
//! ```text
//! omni-index/src/
//! ├── lib.rs      # Re-exports (entry point)
//! ├── error.rs    # IndexError
//! ├── node.rs     # HostNode, LiveElementNode, Bounds
//! └── index.rs    # LiveElementIndex, SelectorQuery
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod error;
mod index;
mod node;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::IndexError;
pub use index::{AddedNode, LiveElementIndex, PendingDelta, SelectorQuery};
pub use node::{Bounds, HostNode, LiveElementNode};
