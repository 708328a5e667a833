//! Instrument command implementation

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::cli::{print_json, InstrumentArgs};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::instrument::{Instrumentation, Instrumenter};
use crate::parse::{load_sources, SourceRange};

/// One row of the printed trace id map
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MapEntry {
    trace_id: u32,
    kind: &'static str,
    file: PathBuf,
    range: SourceRange,
}

/// Run the instrument command
pub fn run(args: InstrumentArgs, config: &Config) -> Result<()> {
    let sources = load_sources(&args.source)?;
    let instrumentation = Instrumenter::new(&config.instrument)?.run(&sources)?;
    let written = instrumentation.write_to(&args.out)?;

    info!(
        files = written.len(),
        units = instrumentation.map.len(),
        "Instrument complete"
    );

    if args.map {
        print_json(&map_entries(&instrumentation), config.output.pretty)?;
    } else {
        println!(
            "Instrumented {} files ({} trace points) into {}",
            instrumentation.files.len(),
            instrumentation.map.len(),
            args.out.display()
        );
    }
    Ok(())
}

fn map_entries(instrumentation: &Instrumentation) -> Vec<MapEntry> {
    instrumentation
        .map
        .iter()
        .map(|(id, target)| {
            let node = instrumentation.sources.node(target.node);
            MapEntry {
                trace_id: id,
                kind: target.kind.as_str(),
                file: node.file().path.clone(),
                range: node.range(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writes_instrumented_tree() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(
            src.join("Main.java"),
            "class Main {\n  void run() {\n    if (true) go();\n  }\n}\n",
        )
        .unwrap();

        let out = dir.path().join("out");
        run(
            InstrumentArgs {
                source: src.clone(),
                out: out.clone(),
                map: false,
            },
            &Config::default(),
        )
        .unwrap();

        let text = std::fs::read_to_string(out.join("Main.java")).unwrap();
        assert!(text.contains("runvis.Tracer.trace(1);"));
        assert!(text.contains("runvis.Tracer.trace(2);"));
        assert!(out.join("runvis/Tracer.java").exists());
    }

    #[test]
    fn test_map_entries_follow_ids() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("A.java"),
            "class A {\n  void a() {\n    while (x) { step(); }\n  }\n}\n",
        )
        .unwrap();
        let sources = load_sources(dir.path()).unwrap();
        let inst = Instrumenter::new(&Config::default().instrument)
            .unwrap()
            .run(&sources)
            .unwrap();

        let entries = map_entries(&inst);
        let kinds: Vec<&str> = entries.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec!["method", "while"]);
        assert_eq!(entries[1].trace_id, 2);
        assert_eq!(entries[1].range.begin_line, 3);
    }
}
