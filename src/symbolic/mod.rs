//! Symbolic values
//!
//! Reads the bounded model checker's assignment steps, maps checker names
//! back to declared source names, and overlays the values on a
//! reconstructed execution tree.
//!
//! @module symbolic

pub mod checker;
pub mod decls;
pub mod flatten;
pub mod merge;

pub use checker::{parse_assignments, read_assignments, VarAssignment};
pub use decls::DeclIndex;
pub use flatten::{flatten, FlatValue};
pub use merge::{merge, MergeMiss, MergeReport};
