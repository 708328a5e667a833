//! Process command implementation

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cli::{print_json, ProcessArgs};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::pipeline::{JobSpec, Pipeline};

/// Run the process command
pub fn run(args: ProcessArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    config.reconstruct.allow_partial |= args.allow_partial;
    config.output.pretty |= args.pretty;
    let pretty = config.output.pretty;

    let jobs = plan_jobs(&args);
    let pipeline = Pipeline::new(config);
    let results = pipeline.run_all(&jobs);

    let mut failed = 0;
    for (job, result) in jobs.iter().zip(results) {
        match result {
            Ok(outcome) => {
                if outcome.unconsumed_tokens > 0 {
                    warn!(
                        job = %outcome.id,
                        remaining = outcome.unconsumed_tokens,
                        "Trace tokens left unconsumed"
                    );
                }
                if let Some(report) = &outcome.merge {
                    info!(
                        job = %outcome.id,
                        matched = report.matched,
                        missed = report.misses.len(),
                        "Merged checker values"
                    );
                }
                match &job.output {
                    Some(path) => println!(
                        "{}: {} nodes -> {}",
                        job.trace_file.display(),
                        outcome.tree.len(),
                        path.display()
                    ),
                    None => print_json(outcome.tree.as_ref(), pretty)?,
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", job.trace_file.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(Error::JobsFailed {
            failed,
            total: jobs.len(),
        });
    }
    Ok(())
}

/// One job per trace file; with several traces `--output` names a directory
fn plan_jobs(args: &ProcessArgs) -> Vec<JobSpec> {
    let several = args.traces.len() > 1;
    args.traces
        .iter()
        .map(|trace| {
            let mut job = JobSpec::new(&args.source, trace);
            if let Some(checker) = &args.checker {
                job = job.with_checker_output(checker);
            }
            if let Some(output) = &args.output {
                job = job.with_output(if several {
                    tree_file_in(output, trace)
                } else {
                    output.clone()
                });
            }
            job
        })
        .collect()
}

fn tree_file_in(dir: &Path, trace: &Path) -> PathBuf {
    let stem = trace
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trace".to_string());
    dir.join(format!("{}.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::load_tree;
    use tempfile::tempdir;

    fn args(source: PathBuf, traces: Vec<PathBuf>, output: Option<PathBuf>) -> ProcessArgs {
        ProcessArgs {
            source,
            traces,
            checker: None,
            output,
            allow_partial: false,
            pretty: false,
        }
    }

    #[test]
    fn test_output_is_directory_for_several_traces() {
        let jobs = plan_jobs(&args(
            PathBuf::from("src"),
            vec![PathBuf::from("runs/a.tr"), PathBuf::from("runs/b.tr")],
            Some(PathBuf::from("trees")),
        ));
        assert_eq!(jobs[0].output, Some(PathBuf::from("trees/a.json")));
        assert_eq!(jobs[1].output, Some(PathBuf::from("trees/b.json")));
        assert_ne!(jobs[0].id, jobs[1].id);

        let single = plan_jobs(&args(
            PathBuf::from("src"),
            vec![PathBuf::from("a.tr")],
            Some(PathBuf::from("tree.json")),
        ));
        assert_eq!(single[0].output, Some(PathBuf::from("tree.json")));
    }

    #[test]
    fn test_process_writes_tree_and_reports_failures() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(
            src.join("Main.java"),
            "class Main {\n  static void main(String[] a) {\n    while (a.length > 0) { break; }\n  }\n}\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("ok.tr"), "1 2").unwrap();
        std::fs::write(dir.path().join("bad.tr"), "1 9").unwrap();

        let out = dir.path().join("tree.json");
        run(
            args(src.clone(), vec![dir.path().join("ok.tr")], Some(out.clone())),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(load_tree(&out).unwrap().len(), 3);

        let err = run(
            args(
                src,
                vec![dir.path().join("ok.tr"), dir.path().join("bad.tr")],
                Some(dir.path().join("trees")),
            ),
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::JobsFailed { failed: 1, total: 2 }));
        assert!(dir.path().join("trees/ok.json").exists());
    }
}
