//! Instrumentation Engine
//!
//! Normalizes bodies into explicit blocks, assigns a unique trace id to
//! every traceable unit, and injects a probe statement at the top of each
//! unit's block. The probe writes the id when the unit runs.
//!
//! Ids start at 1 and follow (file path, document order). Constructors and
//! initializers of class declarations are traced; a constructor's probe goes
//! after its `super(...)`/`this(...)` call. Lambda bodies, anonymous class
//! bodies and enum or record constructors are left untouched: code reached
//! from them shows up in the caller's frame.
//!
//! @module instrument

mod edits;
mod map;
mod normalize;
mod probe;

pub use edits::{apply_insertions, Insertion};
pub use map::{Binding, TraceId, TraceKind, TraceMap, TraceTarget};
pub use normalize::{normalization_insertions, normalize};
pub use probe::Probe;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::config::InstrumentConfig;
use crate::core::error::{Error, Result};
use crate::parse::{parse_sources, SourceSet, SyntaxKind, SyntaxNode, SyntaxRef};

/// One rewritten source file
#[derive(Debug, Clone)]
pub struct InstrumentedFile {
    pub path: PathBuf,
    pub text: String,
}

/// Result of one instrumentation run
#[derive(Debug)]
pub struct Instrumentation {
    /// Normalized sources; every range in the trace tree refers to these
    pub sources: SourceSet,
    pub map: TraceMap,
    pub files: Vec<InstrumentedFile>,
    /// Tracer class the instrumented files depend on
    pub support: InstrumentedFile,
}

/// Instrumentation driver
pub struct Instrumenter {
    probe: Probe,
}

impl Instrumenter {
    pub fn new(config: &InstrumentConfig) -> Result<Self> {
        Ok(Self {
            probe: Probe::new(config)?,
        })
    }

    /// Instrument every file of `sources`
    pub fn run(&self, sources: &SourceSet) -> Result<Instrumentation> {
        self.reject_instrumented(sources)?;
        let normalized = normalize_set(sources)?;

        let mut map = TraceMap::new();
        let mut files = Vec::with_capacity(normalized.len());
        let mut next_id: TraceId = 1;

        for (file_id, file) in normalized.iter() {
            let mut insertions = Vec::new();
            for node in file.iter() {
                if in_untraced_context(node) {
                    continue;
                }
                let Some(kind) = classify(node) else {
                    continue;
                };
                let Some(offset) = probe_offset(node, kind) else {
                    continue;
                };

                let id = next_id;
                next_id += 1;
                map.insert(
                    id,
                    TraceTarget {
                        node: SyntaxRef {
                            file: file_id,
                            node: node.id(),
                        },
                        kind,
                    },
                );
                insertions.push(Insertion::new(offset, self.probe.statement(id), 0));
            }

            debug!(file = %file.path.display(), units = insertions.len(), "Instrumented");
            files.push(InstrumentedFile {
                path: file.path.clone(),
                text: apply_insertions(&file.text, insertions),
            });
        }

        info!(files = files.len(), units = map.len(), "Instrumented sources");

        Ok(Instrumentation {
            sources: normalized,
            map,
            files,
            support: InstrumentedFile {
                path: self.probe.support_path(),
                text: self.probe.support_source(),
            },
        })
    }

    fn reject_instrumented(&self, sources: &SourceSet) -> Result<()> {
        let marker = self.probe.marker();
        match sources.files.iter().find(|f| f.text.contains(&marker)) {
            Some(file) => Err(Error::AlreadyInstrumented {
                path: file.path.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Instrumentation {
    /// Write instrumented files and the tracer class under `out_dir`
    pub fn write_to(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len() + 1);
        for file in self.files.iter().chain(std::iter::once(&self.support)) {
            let target = out_dir.join(&file.path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, &file.text)?;
            written.push(target);
        }
        info!(dir = %out_dir.display(), files = written.len(), "Wrote instrumented sources");
        Ok(written)
    }
}

/// Re-parse every file after brace normalization
pub fn normalize_set(sources: &SourceSet) -> Result<SourceSet> {
    let texts = sources
        .files
        .iter()
        .map(|f| {
            let text = normalize(f).unwrap_or_else(|| f.text.clone());
            (f.path.clone(), text)
        })
        .collect();
    parse_sources(texts)
}

/// Code whose units get no id
fn in_untraced_context(node: SyntaxNode<'_>) -> bool {
    std::iter::once(node)
        .chain(node.ancestors())
        .any(|n| match n.kind() {
            SyntaxKind::LambdaExpression => true,
            SyntaxKind::ClassBody => n
                .parent()
                .map(|p| p.kind() == SyntaxKind::ObjectCreationExpression)
                .unwrap_or(false),
            SyntaxKind::ConstructorDeclaration => declaring_class(n).is_none(),
            SyntaxKind::Block => match n.parent() {
                Some(p) if p.kind() == SyntaxKind::ClassBody => declaring_class(n).is_none(),
                Some(p) => matches!(
                    p.ts_kind(),
                    "enum_body_declarations" | "compact_constructor_declaration"
                ),
                None => false,
            },
            _ => false,
        })
}

/// Class declaration whose body directly holds `member`
pub(crate) fn declaring_class<'a>(member: SyntaxNode<'a>) -> Option<SyntaxNode<'a>> {
    member
        .parent()
        .filter(|body| body.kind() == SyntaxKind::ClassBody)?
        .parent()
        .filter(|class| class.kind() == SyntaxKind::ClassDeclaration)
}

/// Traceable kind of a node, if any
fn classify(node: SyntaxNode<'_>) -> Option<TraceKind> {
    match node.kind() {
        SyntaxKind::MethodDeclaration => node
            .field("body")
            .filter(|b| b.kind() == SyntaxKind::Block)
            .map(|_| TraceKind::Method),
        SyntaxKind::ConstructorDeclaration => node.field("body").map(|_| TraceKind::Constructor),
        SyntaxKind::StaticInitializer => node
            .children()
            .find(|c| c.kind() == SyntaxKind::Block)
            .map(|_| TraceKind::StaticInit),
        kind if kind.is_loop() => node
            .field("body")
            .filter(|b| b.kind() == SyntaxKind::Block)
            .and_then(|_| TraceKind::for_loop(kind)),
        SyntaxKind::Block => {
            let parent = node.parent()?;
            match (parent.kind(), node.field_in_parent()) {
                (SyntaxKind::MethodDeclaration, Some("body")) => None,
                (SyntaxKind::StaticInitializer, _) => None,
                (SyntaxKind::ClassBody, _) => Some(TraceKind::Initializer),
                (kind, Some("body")) if kind.is_loop() => None,
                (SyntaxKind::IfStatement, Some("consequence" | "alternative")) => {
                    Some(TraceKind::Branch)
                }
                _ => Some(TraceKind::Block),
            }
        }
        _ => None,
    }
}

/// Byte offset of the probe: just after the opening brace of the unit's
/// block, or after a constructor's explicit `super(...)`/`this(...)` call
fn probe_offset(node: SyntaxNode<'_>, kind: TraceKind) -> Option<usize> {
    let block = match kind {
        TraceKind::Block | TraceKind::Branch | TraceKind::Initializer => node,
        TraceKind::StaticInit => node.children().find(|c| c.kind() == SyntaxKind::Block)?,
        TraceKind::Constructor => {
            let body = node.field("body")?;
            if let Some(call) = body
                .children()
                .find(|c| c.kind() == SyntaxKind::ExplicitConstructorInvocation)
            {
                return Some(call.bytes().end);
            }
            body
        }
        TraceKind::Method
        | TraceKind::For
        | TraceKind::ForEach
        | TraceKind::While
        | TraceKind::DoWhile => node.field("body")?,
    };
    Some(block.bytes().start + 1)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn instrument(code: &str) -> Instrumentation {
        let sources = parse_sources(vec![(PathBuf::from("Main.java"), code.to_string())]).unwrap();
        Instrumenter::new(&InstrumentConfig::default())
            .unwrap()
            .run(&sources)
            .unwrap()
    }

    fn kinds(inst: &Instrumentation) -> Vec<(TraceId, TraceKind)> {
        inst.map.iter().map(|(id, t)| (id, t.kind)).collect()
    }

    #[test]
    fn test_two_statement_method_gets_one_id() {
        let inst = instrument(
            "class Main {\n    public static void main(String[] args) {\n        int x = 1;\n        x++;\n    }\n}\n",
        );
        assert_eq!(kinds(&inst), vec![(1, TraceKind::Method)]);
        assert!(inst.files[0]
            .text
            .contains("public static void main(String[] args) { runvis.Tracer.trace(1);"));
    }

    #[test]
    fn test_units_in_document_order() {
        let inst = instrument(
            "class Main {
    static void f(int n) {
        for (int i = 0; i < n; i++) {
            if (i % 2 == 0) g(); else { h(); }
        }
        while (n > 0) n--;
        { int z = 0; }
    }
    static void g() {}
    static void h() {}
}
",
        );
        assert_eq!(
            kinds(&inst),
            vec![
                (1, TraceKind::Method),
                (2, TraceKind::For),
                (3, TraceKind::Branch),
                (4, TraceKind::Branch),
                (5, TraceKind::While),
                (6, TraceKind::Block),
                (7, TraceKind::Method),
                (8, TraceKind::Method),
            ]
        );
        let text = &inst.files[0].text;
        assert!(text.contains("if (i % 2 == 0) { runvis.Tracer.trace(3); g(); } else { runvis.Tracer.trace(4); h(); }"));
        assert!(text.contains("while (n > 0) { runvis.Tracer.trace(5); n--; }"));
    }

    #[test]
    fn test_ids_unique_across_files() {
        let sources = parse_sources(vec![
            (PathBuf::from("B.java"), "class B { void b() {} }".into()),
            (PathBuf::from("A.java"), "class A { void a() {} void c() {} }".into()),
        ])
        .unwrap();
        let inst = Instrumenter::new(&InstrumentConfig::default())
            .unwrap()
            .run(&sources)
            .unwrap();
        let names: Vec<(TraceId, String)> = inst
            .map
            .iter()
            .map(|(id, _)| {
                let node = inst.map.node(&inst.sources, id).unwrap();
                (id, node.name().unwrap().to_string())
            })
            .collect();
        assert_eq!(
            names,
            vec![(1, "a".into()), (2, "c".into()), (3, "b".into())]
        );
    }

    #[test]
    fn test_untraced_contexts() {
        let inst = instrument(
            "class Main {
    static { int s = 1; }
    { int t = 2; }
    Main() { if (true) { int u = 3; } }
    void run() {
        Runnable r = () -> { int v = 4; };
        Object o = new Object() { public String toString() { return \"x\"; } };
    }
    abstract static class K { abstract void k(); }
    enum E { A; E() { int w = 5; } }
}
",
        );
        assert_eq!(
            kinds(&inst),
            vec![
                (1, TraceKind::StaticInit),
                (2, TraceKind::Initializer),
                (3, TraceKind::Constructor),
                (4, TraceKind::Branch),
                (5, TraceKind::Method),
            ]
        );
        let node = inst.map.node(&inst.sources, 5).unwrap();
        assert_eq!(node.name(), Some("run"));
        let text = &inst.files[0].text;
        assert!(text.contains("static { runvis.Tracer.trace(1); int s = 1; }"));
        assert!(text.contains("{ runvis.Tracer.trace(2); int t = 2; }"));
        assert!(text.contains("() -> { int v = 4; }"));
        assert!(text.contains("E() { int w = 5; }"));
    }

    #[test]
    fn test_constructor_trace_call_follows_explicit_invocation() {
        let inst = instrument(
            "class Base {
    Base(int x) { }
}
class Main extends Base {
    Main() { super(1); int a = 0; }
    Main(int x) { this(); }
}
",
        );
        assert_eq!(
            kinds(&inst),
            vec![
                (1, TraceKind::Constructor),
                (2, TraceKind::Constructor),
                (3, TraceKind::Constructor),
            ]
        );
        let text = &inst.files[0].text;
        assert!(text.contains("Base(int x) { runvis.Tracer.trace(1); }"));
        assert!(text.contains("Main() { super(1); runvis.Tracer.trace(2); int a = 0; }"));
        assert!(text.contains("Main(int x) { this(); runvis.Tracer.trace(3); }"));
    }

    #[test]
    fn test_reinstrumenting_is_rejected() {
        let inst = instrument("class Main { void f() { g(); } }");
        let again = parse_sources(vec![(
            PathBuf::from("Main.java"),
            inst.files[0].text.clone(),
        )])
        .unwrap();
        let err = Instrumenter::new(&InstrumentConfig::default())
            .unwrap()
            .run(&again)
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyInstrumented { .. }));
    }

    #[test]
    fn test_lines_preserved_through_instrumentation() {
        let code = "class Main {\n  void f(int a) {\n    if (a > 1)\n      f(a - 1);\n  }\n}\n";
        let inst = instrument(code);
        assert_eq!(inst.files[0].text.lines().count(), code.lines().count());
        let branch = inst.map.node(&inst.sources, 2).unwrap();
        assert_eq!(branch.range().begin_line, 4);
    }

    #[test]
    fn test_write_to() {
        let dir = tempfile::tempdir().unwrap();
        let inst = instrument("class Main { void f() {} }");
        let written = inst.write_to(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("Main.java").exists());
        assert!(dir.path().join("runvis/Tracer.java").exists());
    }
}
