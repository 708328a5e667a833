//! Tree-sitter based parsing
//!
//! Parses Java with `tree-sitter-java` and lowers the tree into the owned
//! arena of `parse::syntax`.
//!
//! @module parse/treesitter

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use super::range::SourceRange;
use super::syntax::{NodeData, NodeId, SourceFile, SyntaxKind};
use crate::core::error::{Error, Result};

/// Tree-sitter language for the analyzed sources
fn java_language() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

fn get_parser(path: &Path) -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&java_language())
        .map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(parser)
}

/// Parse one Java source file into an arena
pub fn parse_java(path: &Path, text: String) -> Result<SourceFile> {
    let mut parser = get_parser(path)?;
    let tree = parser.parse(&text, None).ok_or_else(|| Error::Parse {
        path: path.to_path_buf(),
        message: "Parser returned None".to_string(),
    })?;

    let root = tree.root_node();
    let has_errors = root.has_error();
    if has_errors {
        tracing::warn!(file = %path.display(), "Source contains syntax errors, continuing");
    }

    let mut lowering = Lowering {
        source: text.as_bytes(),
        nodes: Vec::with_capacity(root.descendant_count()),
    };
    lowering.lower(root, None);
    let nodes = lowering.nodes;

    Ok(SourceFile {
        path: path.to_path_buf(),
        text,
        nodes,
        has_errors,
    })
}

fn range_of(node: &Node) -> SourceRange {
    let start = node.start_position();
    let end = node.end_position();
    // tree-sitter: 0-based rows, 0-based byte columns, exclusive end
    SourceRange::new(
        start.row as u32 + 1,
        start.column as u32 + 1,
        end.row as u32 + 1,
        end.column as u32,
    )
}

fn is_comment(node: &Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

struct Lowering<'s> {
    source: &'s [u8],
    nodes: Vec<NodeData>,
}

impl Lowering<'_> {
    fn lower(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let kind = SyntaxKind::from_ts(node.kind());
        let text = if kind == SyntaxKind::Identifier {
            node.utf8_text(self.source).ok().map(|s| s.to_string())
        } else {
            None
        };

        self.nodes.push(NodeData {
            kind,
            ts_kind: node.kind(),
            range: range_of(&node),
            bytes: node.byte_range(),
            parent,
            children: Vec::new(),
            fields: Vec::new(),
            text,
        });

        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if child.is_named() && !is_comment(&child) {
                    let field = cursor.field_name();
                    let child_id = self.lower(child, Some(id));
                    let data = &mut self.nodes[id.0 as usize];
                    data.children.push(child_id);
                    if let Some(field) = field {
                        data.fields.push((field, child_id));
                    }
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        id
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(code: &str) -> SourceFile {
        parse_java(&PathBuf::from("Main.java"), code.to_string()).unwrap()
    }

    #[test]
    fn test_lowering_preorder_and_fields() {
        let file = parse(
            "class Main {\n    static int twice(int v) {\n        return v * 2;\n    }\n}\n",
        );
        assert!(!file.has_errors);
        assert_eq!(file.root().kind(), SyntaxKind::Program);

        let method = file
            .iter()
            .find(|n| n.kind() == SyntaxKind::MethodDeclaration)
            .unwrap();
        assert_eq!(method.name(), Some("twice"));
        assert_eq!(method.range().begin_line, 2);
        assert_eq!(method.range().end_line, 4);

        let body = method.field("body").unwrap();
        assert_eq!(body.kind(), SyntaxKind::Block);
        assert!(body.id() > method.id(), "children follow parents");
        assert_eq!(body.children().count(), 1);
        assert_eq!(body.field_in_parent(), Some("body"));
    }

    #[test]
    fn test_comments_are_dropped() {
        let file = parse("class A {\n  void f() {\n    // note\n    g(); /* x */\n  }\n}\n");
        let body = file
            .iter()
            .find(|n| n.kind() == SyntaxKind::Block)
            .unwrap();
        assert_eq!(body.children().count(), 1);
        assert_eq!(
            body.children().next().unwrap().kind(),
            SyntaxKind::ExpressionStatement
        );
    }

    #[test]
    fn test_columns_are_one_based_inclusive() {
        let file = parse("class A { void f() { g(); } }");
        let call = file
            .iter()
            .find(|n| n.kind() == SyntaxKind::MethodInvocation)
            .unwrap();
        // `g()` starts at byte 21 (0-based)
        assert_eq!(call.range(), SourceRange::new(1, 22, 1, 24));
    }

    #[test]
    fn test_for_fields() {
        let file = parse("class A { void f() { for (int i = 0, j = 1; i < 3; i++, j++) {} } }");
        let for_stmt = file
            .iter()
            .find(|n| n.kind() == SyntaxKind::ForStatement)
            .unwrap();
        assert_eq!(for_stmt.fields("init").len(), 1);
        assert!(for_stmt.field("condition").is_some());
        assert_eq!(for_stmt.fields("update").len(), 2);
        assert_eq!(for_stmt.field("body").unwrap().kind(), SyntaxKind::Block);
    }

    #[test]
    fn test_syntax_errors_are_flagged() {
        let file = parse("class A { void f( { }");
        assert!(file.has_errors);
    }
}
