//! End-to-end: instrument, replay a recorded trace, merge checker values

use std::path::Path;

use runvis::instrument::Instrumenter;
use runvis::parse::load_sources;
use runvis::pipeline::{JobSpec, Pipeline};
use runvis::symbolic::flatten;
use runvis::trace::{load_tree, validate, Reconstructor, TraceStream};
use runvis::Config;
use tempfile::tempdir;

const MAIN: &str = "public class Main {
    public static void main(String[] args) {
        int total = sum(3);
        if (total > 2) System.out.println(total);
    }

    static int sum(int n) {
        int acc = 0;
        for (int i = 0; i < n; i++) {
            acc += i;
        }
        return acc;
    }
}
";

const CHECKER: &str = r#"[
  {"program": "JBMC 5.95.1"},
  {"result": [{"property": "java::Main.sum:(I)I.assertion.1", "status": "FAILURE",
    "trace": [
      {"stepType": "assignment", "lhs": "acc", "value": {"data": "0"},
       "sourceLocation": {"file": "Main.java", "line": "8"}},
      {"stepType": "function-call", "sourceLocation": {"file": "Main.java", "line": "3"}}
    ]}]}
]"#;

fn write(path: &Path, text: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

#[test]
fn test_instrument_then_process() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    write(&src.join("Main.java"), MAIN);

    let config = Config::default();
    let sources = load_sources(&src).unwrap();
    let instrumentation = Instrumenter::new(&config.instrument)
        .unwrap()
        .run(&sources)
        .unwrap();
    // main, then-branch, sum, for
    assert_eq!(instrumentation.map.len(), 4);

    let out = dir.path().join("instrumented");
    instrumentation.write_to(&out).unwrap();
    let instrumented = std::fs::read_to_string(out.join("Main.java")).unwrap();
    assert_eq!(instrumented.lines().count(), MAIN.lines().count());
    for id in 1..=4 {
        assert!(instrumented.contains(&format!("runvis.Tracer.trace({});", id)));
    }
    assert!(out.join("runvis/Tracer.java").exists());

    // What the instrumented program records: main, sum, three iterations, branch
    let trace = dir.path().join("Trace.tr");
    write(&trace, "1\n3\n4\n4\n4\n2\n");
    let checker = dir.path().join("jbmc.json");
    write(&checker, CHECKER);

    let pipeline = Pipeline::new(config);
    let job = JobSpec::new(&src, &trace)
        .with_id("run-1")
        .with_checker_output(&checker)
        .with_output(dir.path().join("trees/run-1.json"));
    let outcome = pipeline.run(&job).unwrap();

    assert_eq!(outcome.unconsumed_tokens, 0);
    assert_eq!(outcome.tree.len(), 7);
    let main = outcome.tree.get(1).unwrap();
    assert_eq!(main.method_name.as_deref(), Some("main"));
    assert_eq!(main.children_indices.len(), 2);

    let sum = outcome.tree.get(main.children_indices[0]).unwrap();
    assert_eq!(sum.trace_id, "3");
    assert_eq!(sum.link.as_ref().unwrap().range.begin_line, 3);
    let iterations: Vec<Option<u32>> = sum
        .children_indices
        .iter()
        .map(|&c| outcome.tree.get(c).unwrap().iteration)
        .collect();
    assert_eq!(iterations, vec![Some(1), Some(2), Some(3)]);

    let branch = outcome.tree.get(main.children_indices[1]).unwrap();
    assert_eq!(branch.trace_id, "2");

    let report = outcome.merge.as_ref().unwrap();
    assert_eq!(report.matched, 1);
    assert!(report.misses.is_empty());

    let stored = load_tree(&dir.path().join("trees/run-1.json")).unwrap();
    assert_eq!(&stored, outcome.tree.as_ref());

    let values = flatten(&stored);
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].variable_name, "acc");
    assert_eq!(values[0].value, "0");

    assert!(pipeline.registry().get("run-1").is_some());
}

#[test]
fn test_reconstructed_tree_passes_validation() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    write(&src.join("Main.java"), MAIN);

    let sources = load_sources(&src).unwrap();
    let inst = Instrumenter::new(&Config::default().instrument)
        .unwrap()
        .run(&sources)
        .unwrap();
    let out = Reconstructor::new(&inst.sources, &inst.map)
        .run(TraceStream::parse("1 3 4 4 2").unwrap())
        .unwrap();

    assert!(validate(&out.tree, &inst.map, &inst.sources).is_empty());
}

#[test]
fn test_constructor_across_files() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    write(
        &src.join("Main.java"),
        "public class Main {
    public static void main(String[] args) {
        Counter c = new Counter(2);
        c.bump();
    }
}
",
    );
    write(
        &src.join("Counter.java"),
        "class Counter {
    int count;
    Counter(int start) {
        count = start;
        log();
    }
    void bump() {
        count++;
    }
    void log() {
    }
}
",
    );

    let sources = load_sources(&src).unwrap();
    let inst = Instrumenter::new(&Config::default().instrument)
        .unwrap()
        .run(&sources)
        .unwrap();
    // Counter(int), bump, log, main
    assert_eq!(inst.map.len(), 4);

    // main, Counter(int), log, bump
    let out = Reconstructor::new(&inst.sources, &inst.map)
        .run(TraceStream::parse("4 1 3 2").unwrap())
        .unwrap();
    assert_eq!(out.tree.len(), 5);
    assert!(validate(&out.tree, &inst.map, &inst.sources).is_empty());

    let main = out.tree.get(1).unwrap();
    assert_eq!(main.children_indices, vec![2, 4]);
    let ctor = out.tree.get(2).unwrap();
    let link = ctor.link.as_ref().unwrap();
    assert_eq!(link.file, Path::new("Main.java"));
    assert_eq!(link.range.begin_line, 3);
    assert_eq!(ctor.out_links[0].file, Path::new("Counter.java"));
    assert_eq!(ctor.children_indices, vec![3]);
}

#[test]
fn test_untraceable_remainder_fails_the_job() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    write(&src.join("Main.java"), MAIN);
    // A second main has no call site
    let trace = dir.path().join("Trace.tr");
    write(&trace, "1 3 4 2 1\n");

    let pipeline = Pipeline::new(Config::default());
    let job = JobSpec::new(&src, &trace).with_id("partial");
    assert!(pipeline.run(&job).is_err());
    assert!(pipeline.registry().get("partial").is_none());
}
