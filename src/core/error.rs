//! Error types for runvis

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using runvis' Error
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline phase a job failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Load,
    Instrument,
    Reconstruct,
    Merge,
    Serialize,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Instrument => "instrument",
            Self::Reconstruct => "reconstruct",
            Self::Merge => "merge",
            Self::Serialize => "serialize",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// runvis error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Trace references unknown trace id {id}")]
    UnknownTraceId { id: u32 },

    #[error("Malformed trace token {token:?} at position {position}")]
    TraceFormat { position: usize, token: String },

    #[error("Trace incomplete: {remaining} of {total} tokens left unconsumed")]
    IncompleteTrace { remaining: usize, total: usize },

    #[error("Source already instrumented: {path}")]
    AlreadyInstrumented { path: PathBuf },

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Source directory not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("{program} exited with unexpected code {code:?}: {stderr}")]
    ExternalProcess {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} timed out after {seconds}s")]
    ExternalTimeout { program: String, seconds: u64 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{failed} of {total} job(s) failed")]
    JobsFailed { failed: usize, total: usize },

    #[error("{phase} phase failed: {source}")]
    Phase {
        phase: Phase,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Attribute this error to a pipeline phase. Already attributed errors
    /// keep their original phase.
    pub fn in_phase(self, phase: Phase) -> Self {
        match self {
            Self::Phase { .. } => self,
            other => Self::Phase {
                phase,
                source: Box::new(other),
            },
        }
    }

    /// Phase this error was attributed to, if any
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Extension for tagging results with the phase they belong to
pub trait PhaseExt<T> {
    fn phase(self, phase: Phase) -> Result<T>;
}

impl<T> PhaseExt<T> for Result<T> {
    fn phase(self, phase: Phase) -> Result<T> {
        self.map_err(|e| e.in_phase(phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_phase_keeps_first_phase() {
        let err = Error::UnknownTraceId { id: 9 }
            .in_phase(Phase::Reconstruct)
            .in_phase(Phase::Serialize);
        assert_eq!(err.phase(), Some(Phase::Reconstruct));
        assert!(err.to_string().starts_with("reconstruct phase failed"));
        assert!(err.to_string().contains("unknown trace id 9"));
    }

    #[test]
    fn test_phase_ext() {
        let res: Result<()> = Err(Error::ConfigError {
            message: "bad".into(),
        });
        let err = res.phase(Phase::Load).unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Load));
    }
}
