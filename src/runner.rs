//! Bounded model checker process runner
//!
//! Spawns the checker, collects stdout and stderr, and applies the exit code
//! policy: 0 (no counterexample) and 10 (counterexample found) are normal
//! outcomes, anything else is a failure carrying the captured stderr.
//!
//! @module runner

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::core::config::CheckerConfig;
use crate::core::error::{Error, Result};

/// Exit code reporting a counterexample
pub const COUNTEREXAMPLE_EXIT_CODE: i32 = 10;

/// Captured checker run
#[derive(Debug, Clone)]
pub struct CheckerOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CheckerOutput {
    pub fn counterexample_found(&self) -> bool {
        self.code == COUNTEREXAMPLE_EXIT_CODE
    }
}

/// Builder for one checker invocation
#[derive(Debug, Clone)]
pub struct CheckerRunner {
    program: String,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    accepted_exit_codes: Vec<i32>,
    timeout: Option<Duration>,
}

impl CheckerRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            accepted_exit_codes: vec![0, COUNTEREXAMPLE_EXIT_CODE],
            timeout: None,
        }
    }

    /// Standard checker command line for one entry point
    ///
    /// `function` is the checker's method signature
    /// (`Main.indexMax:([I)I`), `classpath` the compiled classes.
    pub fn for_function(config: &CheckerConfig, function: &str, classpath: &Path) -> Self {
        Self::new(config.binary.clone())
            .arg(function)
            .arg("--classpath")
            .arg(classpath)
            .arg("--unwind")
            .arg(config.unwind.to_string())
            .arg("--unwinding-assertions")
            .arg("--disable-uncaught-exception-check")
            .arg("--throw-runtime-exceptions")
            .arg("--max-nondet-array-length")
            .arg(config.max_array_length.to_string())
            .arg("--json-ui")
            .args(config.extra_args.iter())
            .current_dir(classpath)
            .accepted_exit_codes(config.accepted_exit_codes.clone())
            .timeout(config.timeout_secs.map(Duration::from_secs))
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn accepted_exit_codes(mut self, codes: Vec<i32>) -> Self {
        self.accepted_exit_codes = codes;
        self
    }

    pub fn timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    /// Program and arguments as display strings
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect()
    }

    /// Run to completion and apply the exit code policy
    pub async fn run(&self) -> Result<CheckerOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        debug!(command = ?self.command_line(), "Spawning checker");
        let child = cmd.spawn()?;

        let output = match self.timeout {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    return Err(Error::ExternalTimeout {
                        program: self.program.clone(),
                        seconds: limit.as_secs(),
                    })
                }
            },
            None => child.wait_with_output().await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        match output.status.code() {
            Some(code) if self.accepted_exit_codes.contains(&code) => {
                info!(program = %self.program, code, bytes = stdout.len(), "Checker finished");
                Ok(CheckerOutput {
                    code,
                    stdout,
                    stderr,
                })
            }
            code => Err(Error::ExternalProcess {
                program: self.program.clone(),
                code,
                stderr,
            }),
        }
    }
}
