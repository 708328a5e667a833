//! JSON persistence for trace trees
//!
//! The tree is written as the flat JSON array the visualization UI reads.
//! Writes go to a temporary sibling first and are renamed into place.
//!
//! @module trace/storage

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::types::TraceTree;
use crate::core::error::Result;

/// Serialize a tree to a JSON string
pub fn to_json(tree: &TraceTree, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(tree)?
    } else {
        serde_json::to_string(tree)?
    };
    Ok(json)
}

/// Save a tree to `path`
pub fn save_tree(tree: &TraceTree, path: &Path, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        if pretty {
            serde_json::to_writer_pretty(&mut writer, tree)?;
        } else {
            serde_json::to_writer(&mut writer, tree)?;
        }
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;

    debug!(path = %path.display(), nodes = tree.len(), "Saved trace tree");
    Ok(())
}

/// Load a tree written by `save_tree`
pub fn load_tree(path: &Path) -> Result<TraceTree> {
    let reader = BufReader::new(File::open(path)?);
    let tree: TraceTree = serde_json::from_reader(reader)?;
    debug!(path = %path.display(), nodes = tree.len(), "Loaded trace tree");
    Ok(tree)
}
