//! Symbolic-Value Merge Engine
//!
//! Attaches checker assignments to the execution tree. An assignment lands
//! on the first node, in list order, whose call-site link is in the
//! assignment's file and whose own ranges cover the assignment's line.
//!
//! @module symbolic/merge

use serde::Serialize;
use tracing::{debug, info};

use super::checker::VarAssignment;
use super::decls::DeclIndex;
use crate::parse::simple_file_name;
use crate::trace::{TraceTree, VarValue};

/// An assignment that matched no node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeMiss {
    pub name: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

/// Outcome of one merge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub matched: usize,
    pub misses: Vec<MergeMiss>,
}

/// Merge `assignments` into `tree`. Merging twice appends twice.
pub fn merge(tree: &mut TraceTree, assignments: &[VarAssignment], decls: &DeclIndex) -> MergeReport {
    let mut report = MergeReport::default();

    for assignment in assignments {
        let located = assignment
            .file
            .as_deref()
            .zip(assignment.line)
            .map(|(file, line)| (simple_file_name(file), line));

        let name = located
            .as_ref()
            .and_then(|(file, line)| decls.first(file, *line))
            .unwrap_or(assignment.name.as_str())
            .to_string();

        let Some((file, line)) = located else {
            miss(&mut report, name, assignment);
            continue;
        };

        let target = tree.nodes_mut().iter_mut().find(|node| {
            node.link
                .as_ref()
                .is_some_and(|link| link.file.to_string_lossy().ends_with(file.as_str()))
                && node.covers_line(line)
        });

        match target {
            Some(node) => {
                let iteration = node.iteration.unwrap_or(report.matched as u32 + 1);
                let value = VarValue {
                    trace_id: node.trace_id.clone(),
                    iteration,
                    value: assignment.value.clone(),
                };
                debug!(name = %name, trace_id = %node.trace_id, iteration, "Merged value");
                node.values.entry(name).or_default().push(value);
                report.matched += 1;
            }
            None => miss(&mut report, name, assignment),
        }
    }

    info!(
        matched = report.matched,
        misses = report.misses.len(),
        "Merged symbolic values"
    );
    report
}

fn miss(report: &mut MergeReport, name: String, assignment: &VarAssignment) {
    debug!(
        name = %name,
        file = ?assignment.file,
        line = ?assignment.line,
        "No trace node for assignment"
    );
    report.misses.push(MergeMiss {
        name,
        file: assignment.file.clone(),
        line: assignment.line,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::SourceRange;
    use crate::trace::JumpLink;

    /// Root → main → callee linked from F.java, covering lines 8-12
    fn tree() -> TraceTree {
        let mut tree = TraceTree::new();
        let main = tree.push_child(0, 1);
        tree.get_mut(main).unwrap().ranges.push(SourceRange::new(3, 9, 4, 20));
        let callee = tree.push_child(main, 2);
        let node = tree.get_mut(callee).unwrap();
        node.link = Some(JumpLink::new("src/F.java", SourceRange::new(4, 9, 4, 15)));
        node.ranges.push(SourceRange::new(8, 9, 12, 10));
        tree
    }

    fn assignment(name: &str, file: Option<&str>, line: Option<u32>, value: &str) -> VarAssignment {
        VarAssignment {
            name: name.into(),
            value: value.into(),
            file: file.map(str::to_string),
            line,
            iteration: None,
        }
    }

    #[test]
    fn test_value_lands_on_covering_node_under_declared_name() {
        let mut tree = tree();
        let mut decls = DeclIndex::new();
        decls.record("F.java", 10, "count");

        let report = merge(
            &mut tree,
            &[assignment("F::count!0@1#2", Some("F.java"), Some(10), "7")],
            &decls,
        );
        assert_eq!(report.matched, 1);
        assert!(report.misses.is_empty());

        let values = &tree.get(2).unwrap().values["count"];
        assert_eq!(
            values,
            &vec![VarValue {
                trace_id: "2".into(),
                iteration: 1,
                value: "7".into(),
            }]
        );
    }

    #[test]
    fn test_unmatched_assignment_is_a_miss() {
        let mut tree = tree();
        let before = tree.clone();
        let report = merge(
            &mut tree,
            &[
                assignment("x", Some("F.java"), Some(40), "1"),
                assignment("y", Some("G.java"), Some(10), "2"),
                assignment("z", None, Some(10), "3"),
                assignment("w", Some("F.java"), None, "4"),
            ],
            &DeclIndex::new(),
        );
        assert_eq!(report.matched, 0);
        assert_eq!(report.misses.len(), 4);
        assert_eq!(report.misses[0].name, "x");
        assert_eq!(report.misses[0].line, Some(40));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_iteration_follows_match_count_and_merges_append() {
        let mut tree = tree();
        let assignments = vec![
            assignment("i", Some("F.java"), Some(9), "0"),
            assignment("i", Some("F.java"), Some(9), "1"),
        ];
        merge(&mut tree, &assignments, &DeclIndex::new());
        merge(&mut tree, &assignments, &DeclIndex::new());

        let values = &tree.get(2).unwrap().values["i"];
        let iterations: Vec<u32> = values.iter().map(|v| v.iteration).collect();
        assert_eq!(iterations, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_node_iteration_wins() {
        let mut tree = tree();
        tree.get_mut(2).unwrap().iteration = Some(3);
        merge(
            &mut tree,
            &[assignment("v", Some("F.java"), Some(12), "5")],
            &DeclIndex::new(),
        );
        assert_eq!(tree.get(2).unwrap().values["v"][0].iteration, 3);
    }

    #[test]
    fn test_unlinked_nodes_never_match() {
        let mut tree = tree();
        let report = merge(
            &mut tree,
            &[assignment("m", Some("F.java"), Some(3), "5")],
            &DeclIndex::new(),
        );
        assert_eq!(report.misses.len(), 1);
    }
}
