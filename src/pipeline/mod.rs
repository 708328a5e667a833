//! Job Pipeline
//!
//! Sequences the phases of one job: load sources, instrument (to rebuild the
//! TraceId map), reconstruct the trace, merge checker values, serialize.
//! A failure names the phase it happened in. Complete trees are published
//! to the shared registry; independent jobs run in parallel.
//!
//! @module pipeline

mod registry;

pub use registry::JobRegistry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::core::config::Config;
use crate::core::error::{Phase, PhaseExt, Result};
use crate::instrument::Instrumenter;
use crate::parse::load_sources;
use crate::symbolic::{merge, read_assignments, DeclIndex, MergeReport};
use crate::trace::{save_tree, Reconstructor, TraceStream, TraceTree};

/// Inputs of one processing job
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub id: String,
    /// Original (uninstrumented) source root
    pub source_root: PathBuf,
    /// Trace file written by the instrumented program
    pub trace_file: PathBuf,
    /// Checker JSON output to merge, if any
    pub checker_output: Option<PathBuf>,
    /// Where to write the tree JSON, if anywhere
    pub output: Option<PathBuf>,
}

impl JobSpec {
    /// Job with a fresh id
    pub fn new(source_root: impl Into<PathBuf>, trace_file: impl Into<PathBuf>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_root: source_root.into(),
            trace_file: trace_file.into(),
            checker_output: None,
            output: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_checker_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.checker_output = Some(path.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }
}

/// Result of a successful job
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub id: String,
    pub tree: Arc<TraceTree>,
    /// Tokens left after reconstruction; non-zero only with `allow_partial`
    pub unconsumed_tokens: usize,
    /// Non-fatal: merge statistics and misses
    pub merge: Option<MergeReport>,
}

/// Runs jobs against one configuration and one registry
pub struct Pipeline {
    config: Config,
    registry: Arc<JobRegistry>,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, Arc::new(JobRegistry::new()))
    }

    pub fn with_registry(config: Config, registry: Arc<JobRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Run one job through every phase
    pub fn run(&self, job: &JobSpec) -> Result<JobOutcome> {
        let start = Instant::now();

        let sources = load_sources(&job.source_root).phase(Phase::Load)?;

        let instrumentation = Instrumenter::new(&self.config.instrument)
            .and_then(|i| i.run(&sources))
            .phase(Phase::Instrument)?;

        let reconstruction = TraceStream::read(&job.trace_file)
            .and_then(|stream| {
                Reconstructor::new(&instrumentation.sources, &instrumentation.map)
                    .allow_partial(self.config.reconstruct.allow_partial)
                    .run(stream)
            })
            .phase(Phase::Reconstruct)?;
        let mut tree = reconstruction.tree;

        let merge_report = match &job.checker_output {
            Some(path) => {
                let assignments = read_assignments(path).phase(Phase::Merge)?;
                let decls = DeclIndex::build(&instrumentation.sources);
                Some(merge(&mut tree, &assignments, &decls))
            }
            None => None,
        };

        if let Some(output) = &job.output {
            save_tree(&tree, output, self.config.output.pretty).phase(Phase::Serialize)?;
        }

        let tree = Arc::new(tree);
        if reconstruction.unconsumed_tokens == 0 {
            self.registry.publish(job.id.clone(), Arc::clone(&tree));
        }

        info!(
            job = %job.id,
            nodes = tree.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Job complete"
        );

        Ok(JobOutcome {
            id: job.id.clone(),
            tree,
            unconsumed_tokens: reconstruction.unconsumed_tokens,
            merge: merge_report,
        })
    }

    /// Run independent jobs in parallel; results keep the input order
    pub fn run_all(&self, jobs: &[JobSpec]) -> Vec<Result<JobOutcome>> {
        let results: Vec<Result<JobOutcome>> = jobs.par_iter().map(|job| self.run(job)).collect();
        for (job, result) in jobs.iter().zip(&results) {
            if let Err(e) = result {
                warn!(job = %job.id, error = %e, "Job failed");
            }
        }
        results
    }
}
