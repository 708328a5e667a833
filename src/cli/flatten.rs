//! Flatten command implementation

use crate::cli::{print_json, FlattenArgs};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::symbolic::flatten;
use crate::trace::load_tree;

/// Run the flatten command
pub fn run(args: FlattenArgs, config: &Config) -> Result<()> {
    let tree = load_tree(&args.tree)?;
    print_json(&flatten(&tree), args.pretty || config.output.pretty)
}
