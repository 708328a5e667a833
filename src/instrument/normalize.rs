//! Body normalization
//!
//! Rewrites implicit single-statement bodies into explicit blocks:
//! `if (c) x();` becomes `if (c) { x(); }`, `else if` chains become nested
//! `else { if … }`, and every loop body gets braces. Afterwards each branch
//! and loop body is a `block`, which is what the probe injection and the
//! reconstructor rely on.
//!
//! @module instrument/normalize

use super::edits::{apply_insertions, Insertion};
use crate::parse::{SourceFile, SyntaxKind, SyntaxNode};

/// Statements that must become blocks
fn bodies_needing_braces<'a>(node: SyntaxNode<'a>) -> Vec<SyntaxNode<'a>> {
    let candidates = match node.kind() {
        SyntaxKind::IfStatement => vec![node.field("consequence"), node.field("alternative")],
        kind if kind.is_loop() => vec![node.field("body")],
        _ => vec![],
    };
    candidates
        .into_iter()
        .flatten()
        .filter(|body| body.kind() != SyntaxKind::Block)
        .collect()
}

/// Brace insertions for one file
pub fn normalization_insertions(file: &SourceFile) -> Vec<Insertion> {
    let mut insertions = Vec::new();
    for node in file.iter() {
        for body in bodies_needing_braces(node) {
            let depth = body.depth() as i64;
            let bytes = body.bytes();
            // Same offset: closers before openers, outer opener first,
            // inner closer first.
            insertions.push(Insertion::new(bytes.start, "{ ", depth));
            insertions.push(Insertion::new(bytes.end, " }", -depth - 1));
        }
    }
    insertions
}

/// Normalized text, or `None` when the file already uses explicit blocks
pub fn normalize(file: &SourceFile) -> Option<String> {
    let insertions = normalization_insertions(file);
    if insertions.is_empty() {
        return None;
    }
    Some(apply_insertions(&file.text, insertions))
}
