//! Checker JSON output
//!
//! Extracts variable assignments from the bounded model checker's JSON UI
//! output. The output is either one object or an array of message objects;
//! only messages with a `result` array carry traces.
//!
//! @module symbolic/checker

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::error::Result;

/// Placeholder for steps without a left-hand side
const NO_VAR: &str = "<no_var>";
/// Placeholder for steps without a value
const NO_VAL: &str = "<no_val>";

/// One assignment step of a symbolic execution trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarAssignment {
    /// Checker-side variable name
    pub name: String,
    pub value: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub iteration: Option<u32>,
}

/// Parse every assignment step in `json`
pub fn parse_assignments(json: &str) -> Result<Vec<VarAssignment>> {
    let root: Value = serde_json::from_str(json)?;
    let messages: Vec<&Value> = match &root {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut assignments = Vec::new();
    for message in messages {
        let Some(results) = message.get("result").and_then(Value::as_array) else {
            continue;
        };
        for result in results {
            let steps: &[Value] = match result.get("trace") {
                Some(Value::Array(steps)) => steps.as_slice(),
                Some(trace) => trace
                    .get("steps")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
                None => &[],
            };
            assignments.extend(steps.iter().filter_map(assignment));
        }
    }

    debug!(assignments = assignments.len(), "Parsed checker output");
    Ok(assignments)
}

/// Read and parse a checker output file
pub fn read_assignments(path: &Path) -> Result<Vec<VarAssignment>> {
    let json = std::fs::read_to_string(path)?;
    parse_assignments(&json)
}

fn assignment(step: &Value) -> Option<VarAssignment> {
    match step.get("stepType").and_then(Value::as_str) {
        Some("assignment") => {}
        None if step.get("lhs").is_some() => {}
        _ => return None,
    }

    let name = step
        .get("lhs")
        .and_then(Value::as_str)
        .unwrap_or(NO_VAR)
        .to_string();
    let value = step
        .get("value")
        .map(render_value)
        .unwrap_or_else(|| NO_VAL.to_string());

    let location = step.get("sourceLocation");
    let file = location
        .and_then(|l| l.get("file"))
        .and_then(Value::as_str)
        .filter(|f| !f.is_empty())
        .map(str::to_string);
    let line = location
        .and_then(|l| l.get("line"))
        .and_then(as_number)
        .filter(|&l| l > 0);
    let iteration = step.get("iteration").and_then(as_number);

    Some(VarAssignment {
        name,
        value,
        file,
        line,
        iteration,
    })
}

/// Display text of a step value
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("data") {
            Some(Value::String(s)) => s.clone(),
            Some(data) => data.to_string(),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// Integer given either as a JSON number or as a decimal string
fn as_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
