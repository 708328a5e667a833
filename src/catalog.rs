//! Method catalogue
//!
//! Lists every method declaration of a source set so callers can pick a
//! checker entry point.
//!
//! @module catalog

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::parse::{SourceRange, SourceSet, SyntaxKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub method_name: String,
    /// Whole declaration, signature included
    pub range: SourceRange,
    pub file: PathBuf,
}

/// Method declarations in file order, then document order
pub fn list_methods(sources: &SourceSet) -> Vec<MethodInfo> {
    sources
        .files
        .iter()
        .flat_map(|file| {
            file.iter()
                .filter(|node| node.kind() == SyntaxKind::MethodDeclaration)
                .filter_map(move |node| {
                    Some(MethodInfo {
                        method_name: node.name()?.to_string(),
                        range: node.range(),
                        file: file.path.clone(),
                    })
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_sources;

    #[test]
    fn test_lists_methods_across_files() {
        let sources = parse_sources(vec![
            (
                PathBuf::from("b/Util.java"),
                "interface Util {\n  int twice(int x);\n}\n".into(),
            ),
            (
                PathBuf::from("a/Main.java"),
                "class Main {\n  Main() {}\n  void run() {}\n  static int[] make() { return null; }\n}\n"
                    .into(),
            ),
        ])
        .unwrap();

        let methods = list_methods(&sources);
        let names: Vec<&str> = methods.iter().map(|m| m.method_name.as_str()).collect();
        assert_eq!(names, vec!["run", "make", "twice"]);
        assert_eq!(methods[0].range, SourceRange::new(3, 3, 3, 15));
        assert_eq!(methods[2].file, PathBuf::from("b/Util.java"));

        let json = serde_json::to_value(&methods[0]).unwrap();
        assert_eq!(json["methodName"], "run");
        assert_eq!(json["range"]["beginLine"], 3);
    }
}
