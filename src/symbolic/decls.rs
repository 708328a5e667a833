//! Variable Declaration Mapper
//!
//! One scan over the sources records every declared variable name by
//! (simple file name, line of the name). Symbolic execution reports
//! assignments by file and line only, so this index is how checker-side
//! names are turned back into source names.
//!
//! @module symbolic/decls

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parse::{SourceFile, SourceSet, SyntaxKind};

/// (file simple name, line) → declared names in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclIndex {
    files: BTreeMap<String, BTreeMap<u32, Vec<String>>>,
}

impl DeclIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every file of `sources`
    pub fn build(sources: &SourceSet) -> Self {
        let per_file: Vec<(String, Vec<(u32, String)>)> = sources
            .files
            .par_iter()
            .map(|file| (file.simple_name(), declarations(file)))
            .collect();

        let mut index = Self::new();
        for (file, decls) in per_file {
            for (line, name) in decls {
                index.record(&file, line, name);
            }
        }
        debug!(files = index.files.len(), "Built declaration index");
        index
    }

    pub fn record(&mut self, file: &str, line: u32, name: impl Into<String>) {
        self.files
            .entry(file.to_string())
            .or_default()
            .entry(line)
            .or_default()
            .push(name.into());
    }

    /// Names declared on `line` of `file`, in source order
    pub fn names(&self, file: &str, line: u32) -> &[String] {
        self.files
            .get(file)
            .and_then(|lines| lines.get(&line))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The first name declared on that line
    pub fn first(&self, file: &str, line: u32) -> Option<&str> {
        self.names(file, line).first().map(String::as_str)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// (line, name) of every declarator and for-each variable
fn declarations(file: &SourceFile) -> Vec<(u32, String)> {
    file.iter()
        .filter_map(|node| {
            let name = match node.kind() {
                SyntaxKind::VariableDeclarator => node.name_node(),
                SyntaxKind::EnhancedForStatement => node.field("name"),
                _ => None,
            }?;
            let text = name.text()?;
            Some((name.range().begin_line, text.to_string()))
        })
        .collect()
}
