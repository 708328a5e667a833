//! runvis - execution trace reconstruction for Java programs
//!
//! Instruments Java sources with trace probes, rebuilds the execution tree
//! from the id stream the instrumented program writes, and decorates the
//! tree with variable values taken from a bounded model checker.

pub mod catalog;
pub mod cli;
pub mod core;
pub mod instrument;
pub mod parse;
pub mod pipeline;
pub mod runner;
pub mod symbolic;
pub mod trace;

pub use core::config::Config;
pub use core::error::{Error, Result};
