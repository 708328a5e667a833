//! Check command implementation

use std::time::Duration;

use tracing::info;

use crate::cli::CheckArgs;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::runner::CheckerRunner;

/// Run the check command
pub async fn run(args: CheckArgs, config: &Config) -> Result<()> {
    let mut checker = config.checker.clone();
    if let Some(unwind) = args.unwind {
        checker.unwind = unwind;
    }
    if let Some(length) = args.max_array_length {
        checker.max_array_length = length;
    }

    let mut runner = CheckerRunner::for_function(&checker, &args.function, &args.classpath);
    if let Some(secs) = args.timeout {
        runner = runner.timeout(Some(Duration::from_secs(secs)));
    }

    let output = runner.run().await?;
    info!(
        function = %args.function,
        counterexample = output.counterexample_found(),
        "Check complete"
    );

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &output.stdout)?;
            let verdict = if output.counterexample_found() {
                "counterexample found"
            } else {
                "no counterexample"
            };
            println!("{}: {} -> {}", args.function, verdict, path.display());
        }
        None => print!("{}", output.stdout),
    }
    Ok(())
}
