//! Text insertions applied to source files
//!
//! Both normalization and probe injection are pure insertions at byte
//! offsets of the parsed text. None of them introduce line breaks, so line
//! numbers survive every rewrite.
//!
//! @module instrument/edits

/// Insert `text` at byte `offset`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub offset: usize,
    pub text: String,
    /// Tie-breaker for insertions sharing an offset; lower goes first
    pub order: i64,
}

impl Insertion {
    pub fn new(offset: usize, text: impl Into<String>, order: i64) -> Self {
        Self {
            offset,
            text: text.into(),
            order,
        }
    }
}

/// Apply insertions to `source`. Offsets refer to the original text.
pub fn apply_insertions(source: &str, mut insertions: Vec<Insertion>) -> String {
    if insertions.is_empty() {
        return source.to_string();
    }

    insertions.sort_by_key(|ins| (ins.offset, ins.order));

    let extra: usize = insertions.iter().map(|i| i.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut cursor = 0;
    for ins in &insertions {
        out.push_str(&source[cursor..ins.offset]);
        out.push_str(&ins.text);
        cursor = ins.offset;
    }
    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_in_offset_then_order() {
        let out = apply_insertions(
            "abc",
            vec![
                Insertion::new(3, "]", 5),
                Insertion::new(1, "<", 0),
                Insertion::new(3, ")", 1),
            ],
        );
        assert_eq!(out, "a<bc)]");
    }

    #[test]
    fn test_no_insertions() {
        assert_eq!(apply_insertions("x = 1;", vec![]), "x = 1;");
    }
}
