//! Structural validation of decoded plans
//!
//! Runs on the raw JSON value before any typed decoding so that a malformed
//! plan is rejected as a whole: one bad element discards every invocation.

use serde_json::Value;

use crate::core::error::{DeskError, Result};
use crate::core::types::Plan;

/// Check a decoded candidate against the plan shape
///
/// Valid when the candidate is an object holding a `tool_calls` array whose
/// elements are all objects with both a `name` and an `arguments` key.
/// An empty `tool_calls` array is valid; a missing one is not.
pub fn validate_plan(candidate: &Value) -> bool {
    violation(candidate).is_none()
}

/// Describe the first shape violation, if any
pub fn violation(candidate: &Value) -> Option<String> {
    let Some(object) = candidate.as_object() else {
        return Some("plan is not a JSON object".into());
    };
    let Some(tool_calls) = object.get("tool_calls") else {
        return Some("missing 'tool_calls'".into());
    };
    let Some(elements) = tool_calls.as_array() else {
        return Some("'tool_calls' is not an array".into());
    };

    for (index, element) in elements.iter().enumerate() {
        let Some(call) = element.as_object() else {
            return Some(format!("tool call {} is not an object", index));
        };
        if !call.contains_key("name") {
            return Some(format!("tool call {} has no 'name'", index));
        }
        if !call.contains_key("arguments") {
            return Some(format!("tool call {} has no 'arguments'", index));
        }
    }

    None
}

/// Validate a candidate and decode it into a typed plan
///
/// Beyond the shape check, every `name` must be a non-empty string and every
/// `arguments` value an object.
pub fn into_plan(candidate: Value) -> Result<Plan> {
    if let Some(reason) = violation(&candidate) {
        return Err(DeskError::InvalidPlan(reason));
    }

    let plan: Plan =
        serde_json::from_value(candidate).map_err(|e| DeskError::InvalidPlan(e.to_string()))?;

    if let Some(index) = plan.tool_calls.iter().position(|c| c.name.trim().is_empty()) {
        return Err(DeskError::InvalidPlan(format!(
            "tool call {} has an empty name",
            index
        )));
    }

    Ok(plan)
}
