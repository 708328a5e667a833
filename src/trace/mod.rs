//! Runvis Trace - Dynamic Execution Trees
//!
//! This module turns the runtime id stream of an instrumented program into
//! the execution tree the visualization steps through:
//! - Token stream parsing (one id per line)
//! - Single-pass tree reconstruction against the TraceId map
//! - Structural validation of finished trees
//! - JSON persistence
//!
//! @module trace

pub mod reconstruct;
pub mod storage;
pub mod stream;
pub mod types;
pub mod validate;

pub use reconstruct::{Reconstruction, Reconstructor};
pub use storage::{load_tree, save_tree, to_json};
pub use stream::TraceStream;
pub use types::{JumpLink, TraceNode, TraceTree, VarValue, ROOT_TRACE_ID};
pub use validate::{validate, Violation};
