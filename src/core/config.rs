//! Configuration management

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub instrument: InstrumentConfig,
    pub reconstruct: ReconstructConfig,
    pub checker: CheckerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Fully qualified name of the emitted tracer class
    pub tracer_class: String,
    /// File the instrumented program appends trace ids to
    pub trace_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReconstructConfig {
    /// Accept trees that leave trace tokens unconsumed
    pub allow_partial: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Checker executable
    pub binary: String,
    /// Loop unwinding bound
    pub unwind: u32,
    /// Maximum nondeterministic array length
    pub max_array_length: u32,
    /// Exit codes that mean "ran to completion"
    pub accepted_exit_codes: Vec<i32>,
    /// Kill the checker after this many seconds
    pub timeout_secs: Option<u64>,
    /// Additional arguments appended verbatim
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON artifacts
    pub pretty: bool,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            tracer_class: "runvis.Tracer".to_string(),
            trace_file: "Trace.tr".to_string(),
        }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            binary: "jbmc".to_string(),
            unwind: 5,
            max_array_length: 5,
            // 0 = no counterexample, 10 = counterexample found
            accepted_exit_codes: vec![0, 10],
            timeout_secs: Some(120),
            extra_args: vec![],
        }
    }
}

impl InstrumentConfig {
    /// Split `tracer_class` into (package, simple class name)
    pub fn tracer_parts(&self) -> Result<(Option<&str>, &str)> {
        let fqcn = self.tracer_class.trim();
        let valid = !fqcn.is_empty()
            && fqcn
                .split('.')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_'));
        if !valid {
            return Err(Error::ConfigError {
                message: format!("invalid tracer class name: {:?}", self.tracer_class),
            });
        }
        Ok(match fqcn.rsplit_once('.') {
            Some((package, class)) => (Some(package), class),
            None => (None, fqcn),
        })
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::runvis_home()?.join("config.toml"))
    }

    /// Get the runvis home directory
    pub fn runvis_home() -> Result<PathBuf> {
        // Check RUNVIS_HOME env var first
        if let Ok(home) = std::env::var("RUNVIS_HOME") {
            return Ok(PathBuf::from(home));
        }

        ProjectDirs::from("dev", "runvis", "runvis")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine runvis home directory".to_string(),
            })
    }
}
