//! Structural checks for finished trees
//!
//! @module trace/validate

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use super::types::TraceTree;
use crate::instrument::TraceMap;
use crate::parse::{SourceRange, SourceSet};

/// One broken invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub node: usize,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}: {}", self.node, self.message)
    }
}

/// Check parent/child consistency, loop iteration numbering and that no own
/// range overlaps a child's extent. Returns every violation found.
///
/// Overlap is decided on (line, column) positions, not whole lines: an own
/// range ending on the line where a child's extent starts, but before its
/// first column, is accepted. Single-line statements such as
/// `if (c) { f(); }` legitimately share a line between the guard and the
/// child, so a line-granular check would reject valid trees.
pub fn validate(tree: &TraceTree, map: &TraceMap, sources: &SourceSet) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut report = |node: usize, message: String| violations.push(Violation { node, message });

    for (index, node) in tree.iter() {
        match node.parent_index {
            None if index != 0 => report(index, "only the root may lack a parent".into()),
            Some(_) if index == 0 => report(index, "root has a parent".into()),
            Some(parent) => match tree.get(parent) {
                None => report(index, format!("parent {} out of bounds", parent)),
                Some(p) => {
                    let listed = p.children_indices.iter().filter(|&&c| c == index).count();
                    if listed != 1 {
                        report(index, format!("listed {} times by parent {}", listed, parent));
                    }
                }
            },
            None => {}
        }

        for &child in &node.children_indices {
            match tree.get(child) {
                Some(c) if c.parent_index == Some(index) => {}
                _ => report(index, format!("child {} does not point back", child)),
            }
        }

        // Loop siblings per trace id must count 1..N
        let mut seen: HashMap<&str, u32> = HashMap::new();
        for &child in &node.children_indices {
            let Some(c) = tree.get(child) else { continue };
            let Some(iteration) = c.iteration else { continue };
            let expected = seen.entry(c.trace_id.as_str()).or_insert(0);
            *expected += 1;
            if iteration != *expected {
                report(
                    child,
                    format!("iteration {} where {} was expected", iteration, expected),
                );
            }
        }

        let file = node
            .numeric_id()
            .and_then(|id| map.node(sources, id))
            .map(|n| n.file().path.as_path());
        for &child in &node.children_indices {
            let Some(extent) = child_extent(tree, map, sources, child, file) else {
                continue;
            };
            for range in &node.ranges {
                if range.overlaps(&extent) {
                    report(
                        index,
                        format!("range {} overlaps child {} at {}", range, child, extent),
                    );
                }
            }
        }
    }

    violations
}

/// Source extent a child occupies inside its parent, if it lies in the
/// parent's file
fn child_extent(
    tree: &TraceTree,
    map: &TraceMap,
    sources: &SourceSet,
    child: usize,
    parent_file: Option<&Path>,
) -> Option<SourceRange> {
    let node = tree.get(child)?;
    if let Some(link) = &node.link {
        return (parent_file == Some(link.file.as_path())).then_some(link.range);
    }
    let id = node.numeric_id()?;
    let target = map.get(id)?;
    let syntax = sources.node(target.node);
    if target.kind.is_loop() {
        return syntax.field("body").map(|b| b.range());
    }
    Some(syntax.range())
}
