//! runvis CLI entry point

use clap::Parser;
use runvis::cli::{load_config, Cli, Commands};
use runvis::core::error::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("RUNVIS_LOG"))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Instrument(args) => runvis::cli::instrument::run(args, &config),
        Commands::Process(args) => runvis::cli::process::run(args, &config),
        Commands::Check(args) => runvis::cli::check::run(args, &config).await,
        Commands::Methods(args) => runvis::cli::methods::run(args, &config),
        Commands::Decls(args) => runvis::cli::decls::run(args, &config),
        Commands::Flatten(args) => runvis::cli::flatten::run(args, &config),
    }
}
