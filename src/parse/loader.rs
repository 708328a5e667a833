//! Source set loading
//!
//! @module parse/loader

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use super::syntax::{SourceFile, SourceSet};
use super::treesitter::parse_java;
use super::walker::FileWalker;
use crate::core::error::Result;

/// Read and parse every Java file under `root`. Paths are stored relative
/// to `root`.
pub fn load_sources(root: &Path) -> Result<SourceSet> {
    let paths = FileWalker::new(root).walk()?;

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(&path)?;
        let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        sources.push((rel, text));
    }

    let set = parse_sources(sources)?;
    info!(root = %root.display(), files = set.len(), "Loaded sources");
    Ok(set)
}

/// Parse in-memory sources in parallel
pub fn parse_sources(sources: Vec<(PathBuf, String)>) -> Result<SourceSet> {
    let files: Vec<SourceFile> = sources
        .into_par_iter()
        .map(|(path, text)| {
            let file = parse_java(&path, text)?;
            debug!(file = %path.display(), nodes = file.nodes.len(), "Parsed");
            Ok(file)
        })
        .collect::<Result<_>>()?;

    Ok(SourceSet::new(files))
}
