//! Flat listing of merged values
//!
//! @module symbolic/flatten

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::trace::TraceTree;

/// One value of one variable at one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatValue {
    pub node_trace_id: String,
    pub variable_name: String,
    pub iteration: u32,
    pub value: String,
}

/// Every value of every node, in node order then variable name order
pub fn flatten(tree: &TraceTree) -> Vec<FlatValue> {
    let flat: Vec<FlatValue> = tree
        .nodes()
        .iter()
        .flat_map(|node| {
            node.values.iter().flat_map(move |(name, values)| {
                values.iter().map(move |v| FlatValue {
                    node_trace_id: node.trace_id.clone(),
                    variable_name: name.clone(),
                    iteration: v.iteration,
                    value: v.value.clone(),
                })
            })
        })
        .collect();
    info!(nodes = tree.len(), values = flat.len(), "Flattened values");
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::VarValue;

    #[test]
    fn test_flatten_order() {
        let mut tree = TraceTree::new();
        let a = tree.push_child(0, 1);
        let b = tree.push_child(a, 2);
        let value = |iteration, value: &str| VarValue {
            trace_id: "x".into(),
            iteration,
            value: value.into(),
        };
        tree.get_mut(b).unwrap().values.insert("y".into(), vec![value(1, "2")]);
        tree.get_mut(a)
            .unwrap()
            .values
            .insert("x".into(), vec![value(1, "0"), value(2, "1")]);

        let flat = flatten(&tree);
        let rows: Vec<(&str, &str, u32, &str)> = flat
            .iter()
            .map(|f| {
                (
                    f.node_trace_id.as_str(),
                    f.variable_name.as_str(),
                    f.iteration,
                    f.value.as_str(),
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![("1", "x", 1, "0"), ("1", "x", 2, "1"), ("2", "y", 1, "2")]
        );

        let json = serde_json::to_value(&flat[0]).unwrap();
        assert_eq!(json["nodeTraceId"], "1");
        assert_eq!(json["variableName"], "x");
    }
}
