use crate::core::error::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Java sources larger than this are not analyzed
pub const MAX_FILE_SIZE: u64 = 1_048_576;

/// Walks project files respecting .gitignore
pub struct FileWalker {
    root: PathBuf,
}

impl FileWalker {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Walk all Java sources under the root, sorted by path
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::SourceNotFound {
                path: self.root.clone(),
            });
        }

        let mut files = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .hidden(true)           // Skip hidden files
            .git_ignore(true)       // Respect .gitignore
            .git_global(true)       // Respect global gitignore
            .git_exclude(true)      // Respect .git/info/exclude
            .require_git(false)     // Work even without .git
            .build();

        for entry in walker.flatten() {
            let path = entry.path();

            if path.is_dir() {
                continue;
            }

            if let Ok(meta) = path.metadata() {
                if meta.len() > MAX_FILE_SIZE {
                    tracing::warn!(file = %path.display(), "Skipping oversized source");
                    continue;
                }
            }

            if Self::is_java_file(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn is_java_file(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("java"))
            .unwrap_or(false)
    }
}
