//! Decls command implementation

use tracing::info;

use crate::cli::{print_json, SourceArgs};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::instrument::normalize_set;
use crate::parse::load_sources;
use crate::symbolic::DeclIndex;

/// Run the decls command
///
/// Lines refer to the normalized sources, the text checker locations and
/// tree ranges are reported against.
pub fn run(args: SourceArgs, config: &Config) -> Result<()> {
    let sources = load_sources(&args.source)?;
    let index = DeclIndex::build(&normalize_set(&sources)?);
    info!(files = index.file_count(), "Built declaration index");
    print_json(&index, args.pretty || config.output.pretty)
}
