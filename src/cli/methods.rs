//! Methods command implementation

use tracing::info;

use crate::catalog::list_methods;
use crate::cli::{print_json, SourceArgs};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::parse::load_sources;

/// Run the methods command
pub fn run(args: SourceArgs, config: &Config) -> Result<()> {
    let sources = load_sources(&args.source)?;
    let methods = list_methods(&sources);
    info!(methods = methods.len(), "Listed methods");
    print_json(&methods, args.pretty || config.output.pretty)
}
