//! CLI command definitions and handlers

pub mod check;
pub mod decls;
pub mod flatten;
pub mod instrument;
pub mod methods;
pub mod process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::config::Config;
use crate::core::error::Result;

const LONG_ABOUT: &str = r#"
Record what a Java program actually executed and replay it step by step.

WORKFLOW:
    1. runvis instrument src -o build/instrumented   Inject trace probes
    2. (compile and run the instrumented sources; they write Trace.tr)
    3. runvis process src -t Trace.tr -o tree.json   Rebuild the execution tree

SYMBOLIC VALUES:
    runvis methods src                               List checker entry points
    runvis check 'Main.f:(I)I' --classpath classes   Run the model checker
    runvis process src -t Trace.tr --checker out.json -o tree.json
    runvis flatten tree.json                         Flat value listing

Logging is controlled with RUNVIS_LOG (e.g. RUNVIS_LOG=runvis=debug).
"#;

/// Execution trace reconstruction for Java programs
#[derive(Parser, Debug)]
#[command(name = "runvis")]
#[command(author, version)]
#[command(about = "Execution trace reconstruction for Java programs")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: $RUNVIS_HOME/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Instrument a source tree with trace probes
    #[command(visible_alias = "i")]
    Instrument(InstrumentArgs),

    /// Rebuild execution trees from trace files
    #[command(visible_alias = "p")]
    Process(ProcessArgs),

    /// Run the bounded model checker on one method
    Check(CheckArgs),

    /// List method declarations
    Methods(SourceArgs),

    /// Show the variable declaration index
    Decls(SourceArgs),

    /// Flatten the values of a merged tree
    Flatten(FlattenArgs),
}

/// Arguments for the instrument command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:
    runvis instrument src -o out          Write instrumented copy to out/
    runvis instrument src -o out --map    Also print the trace id map")]
pub struct InstrumentArgs {
    /// Source root
    pub source: PathBuf,

    /// Output directory for instrumented sources
    #[arg(short, long)]
    pub out: PathBuf,

    /// Print the trace id map as JSON
    #[arg(long)]
    pub map: bool,
}

/// Arguments for the process command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:
    runvis process src -t Trace.tr                    Print the tree
    runvis process src -t Trace.tr -o tree.json       Write the tree
    runvis process src -t a.tr -t b.tr -o trees/      One tree per trace
    runvis process src -t Trace.tr --checker jbmc.json -o tree.json")]
pub struct ProcessArgs {
    /// Original (uninstrumented) source root
    pub source: PathBuf,

    /// Trace file(s); several traces are processed in parallel
    #[arg(short, long = "trace", required = true)]
    pub traces: Vec<PathBuf>,

    /// Checker JSON output to merge into every tree
    #[arg(long)]
    pub checker: Option<PathBuf>,

    /// Output file, or directory when several traces are given
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep trees that leave trace tokens unconsumed
    #[arg(long)]
    pub allow_partial: bool,

    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Method signature as the checker expects it (e.g. 'Main.max:([I)I')
    pub function: String,

    /// Directory holding the compiled classes
    #[arg(long)]
    pub classpath: PathBuf,

    /// Loop unwinding bound
    #[arg(long)]
    pub unwind: Option<u32>,

    /// Maximum nondeterministic array length
    #[arg(long)]
    pub max_array_length: Option<u32>,

    /// Timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write the checker JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for commands reading a source root
#[derive(Parser, Debug)]
pub struct SourceArgs {
    /// Source root
    pub source: PathBuf,

    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the flatten command
#[derive(Parser, Debug)]
pub struct FlattenArgs {
    /// Tree JSON written by `process`
    pub tree: PathBuf,

    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Load the configuration named on the command line, or the default one
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Print a value as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_accepts_several_traces() {
        let cli = Cli::parse_from([
            "runvis", "process", "src", "-t", "a.tr", "--trace", "b.tr", "-o", "out",
        ]);
        match cli.command {
            Commands::Process(args) => {
                assert_eq!(args.traces, vec![PathBuf::from("a.tr"), PathBuf::from("b.tr")]);
                assert_eq!(args.output, Some(PathBuf::from("out")));
                assert!(!args.allow_partial);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["runvis", "methods", "src", "--config", "c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Commands::Methods(_)));
    }

    #[test]
    fn test_process_requires_a_trace() {
        assert!(Cli::try_parse_from(["runvis", "process", "src"]).is_err());
    }
}
