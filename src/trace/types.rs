//! Dynamic execution tree
//!
//! The tree is a flat arena: index 0 is the synthetic root, every other node
//! names its parent by index and lists its children by index. The serialized
//! form is the JSON array the visualization UI loads.
//!
//! @module trace/types

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::instrument::TraceId;
use crate::parse::SourceRange;

/// Trace id label of the synthetic root
pub const ROOT_TRACE_ID: &str = "root";

// =============================================================================
// LINKS AND VALUES
// =============================================================================

/// A range in a specific file; used for call sites and landing sites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpLink {
    #[serde(flatten)]
    pub range: SourceRange,
    pub file: PathBuf,
}

impl JumpLink {
    pub fn new(file: impl Into<PathBuf>, range: SourceRange) -> Self {
        Self {
            range,
            file: file.into(),
        }
    }
}

/// One symbolic value attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarValue {
    pub trace_id: String,
    pub iteration: u32,
    pub value: String,
}

// =============================================================================
// TRACE NODE
// =============================================================================

/// One node of the reconstructed execution tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceNode {
    /// `None` only for the root
    pub parent_index: Option<usize>,
    /// Decimal trace id, or `"root"`
    pub trace_id: String,
    /// Executed ranges not represented by a child
    pub ranges: Vec<SourceRange>,
    pub children_indices: Vec<usize>,
    /// Call expression that entered this node (methods only)
    pub link: Option<JumpLink>,
    /// Landing sites inside this node (callee name for methods)
    pub out_links: Vec<JumpLink>,
    /// Node that resumes once this one returns
    pub out_index: Option<usize>,
    /// 1-based iteration among same-parent siblings (loops only)
    pub iteration: Option<u32>,
    /// Declared name of the method or constructor
    #[serde(default)]
    pub method_name: Option<String>,
    /// Variable name → values, in merge order
    #[serde(default)]
    pub values: BTreeMap<String, Vec<VarValue>>,
}

impl TraceNode {
    pub fn root() -> Self {
        Self::new(None, ROOT_TRACE_ID.to_string())
    }

    pub fn new(parent_index: Option<usize>, trace_id: String) -> Self {
        Self {
            parent_index,
            trace_id,
            ranges: Vec::new(),
            children_indices: Vec::new(),
            link: None,
            out_links: Vec::new(),
            out_index: None,
            iteration: None,
            method_name: None,
            values: BTreeMap::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_index.is_none()
    }

    /// Numeric trace id; `None` for the root
    pub fn numeric_id(&self) -> Option<TraceId> {
        self.trace_id.parse().ok()
    }

    /// Whether any own range covers `line`
    pub fn covers_line(&self, line: u32) -> bool {
        self.ranges.iter().any(|r| r.covers_line(line))
    }
}

// =============================================================================
// TRACE TREE
// =============================================================================

/// Flat execution tree; index 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TraceTree {
    nodes: Vec<TraceNode>,
}

impl<'de> Deserialize<'de> for TraceTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nodes = Vec::<TraceNode>::deserialize(deserializer)?;
        match nodes.first() {
            None => return Err(D::Error::custom("trace tree holds no root node")),
            Some(first) if !first.is_root() => {
                return Err(D::Error::custom("first trace node is not the root"))
            }
            Some(_) => {}
        }
        for (index, node) in nodes.iter().enumerate().skip(1) {
            match node.parent_index {
                None => {
                    return Err(D::Error::custom(format!(
                        "trace node {} has no parent",
                        index
                    )))
                }
                Some(parent) if parent >= nodes.len() => {
                    return Err(D::Error::custom(format!(
                        "trace node {} points at missing parent {}",
                        index, parent
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(Self { nodes })
    }
}

impl Default for TraceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceTree {
    /// Tree holding only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![TraceNode::root()],
        }
    }

    pub fn root(&self) -> &TraceNode {
        &self.nodes[0]
    }

    pub fn get(&self, index: usize) -> Option<&TraceNode> {
        self.nodes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TraceNode> {
        self.nodes.get_mut(index)
    }

    /// Append a child of `parent` and return its index
    pub fn push_child(&mut self, parent: usize, trace_id: TraceId) -> usize {
        let index = self.nodes.len();
        self.nodes
            .push(TraceNode::new(Some(parent), trace_id.to_string()));
        self.nodes[parent].children_indices.push(index);
        index
    }

    pub fn nodes(&self) -> &[TraceNode] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TraceNode)> {
        self.nodes.iter().enumerate()
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [TraceNode] {
        &mut self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root; deserialization rejects rootless input
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_child_links_both_ways() {
        let mut tree = TraceTree::new();
        let a = tree.push_child(0, 3);
        let b = tree.push_child(a, 4);
        assert_eq!(tree.root().children_indices, vec![a]);
        assert_eq!(tree.get(b).unwrap().parent_index, Some(a));
        assert_eq!(tree.get(b).unwrap().numeric_id(), Some(4));
        assert_eq!(tree.root().numeric_id(), None);
    }

    #[test]
    fn test_json_shape() {
        let mut tree = TraceTree::new();
        let a = tree.push_child(0, 1);
        let node = tree.get_mut(a).unwrap();
        node.ranges.push(SourceRange::new(3, 9, 3, 18));
        node.link = Some(JumpLink::new("Main.java", SourceRange::new(2, 5, 2, 10)));
        node.out_index = Some(0);

        let json = serde_json::to_value(&tree).unwrap();
        let root = &json[0];
        assert_eq!(root["traceId"], "root");
        assert!(root["parentIndex"].is_null());
        assert_eq!(root["childrenIndices"], serde_json::json!([1]));

        let child = &json[1];
        assert_eq!(child["parentIndex"], 0);
        assert_eq!(child["traceId"], "1");
        assert_eq!(child["ranges"][0]["beginCol"], 9);
        assert_eq!(child["link"]["file"], "Main.java");
        assert_eq!(child["link"]["endCol"], 10);
        assert_eq!(child["outIndex"], 0);
        assert!(child["iteration"].is_null());
        assert_eq!(child["values"], serde_json::json!({}));

        let back: TraceTree = serde_json::from_value(json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_rootless_json_is_rejected() {
        let empty: Result<TraceTree, _> = serde_json::from_str("[]");
        assert!(empty.unwrap_err().to_string().contains("no root"));

        let headless = r#"[{"parentIndex": 0, "traceId": "1", "ranges": [],
            "childrenIndices": [], "link": null, "outLinks": [],
            "outIndex": null, "iteration": null}]"#;
        let err = serde_json::from_str::<TraceTree>(headless).unwrap_err();
        assert!(err.to_string().contains("not the root"));

        let dangling = r#"[
            {"parentIndex": null, "traceId": "root", "ranges": [],
             "childrenIndices": [1], "link": null, "outLinks": [],
             "outIndex": null, "iteration": null},
            {"parentIndex": 7, "traceId": "1", "ranges": [],
             "childrenIndices": [], "link": null, "outLinks": [],
             "outIndex": null, "iteration": null}]"#;
        let err = serde_json::from_str::<TraceTree>(dangling).unwrap_err();
        assert!(err.to_string().contains("missing parent 7"));
    }
}
