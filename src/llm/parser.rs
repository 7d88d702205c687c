//! Turn raw planner responses into validated plans
//!
//! The planner is asked for a single fenced ```` ```json ```` block. Text
//! around the block is ignored; a response without one is a planning failure.

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::error::{DeskError, Result};
use crate::core::types::Plan;
use crate::plan::validator::into_plan;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Extract the contents of the first fenced JSON block
pub fn extract_json_block(response: &str) -> Result<&str> {
    let start = response
        .find(FENCE_OPEN)
        .map(|i| i + FENCE_OPEN.len())
        .ok_or(DeskError::PlanNotFound)?;
    let len = response[start..]
        .find(FENCE_CLOSE)
        .ok_or(DeskError::PlanNotFound)?;
    Ok(response[start..start + len].trim())
}

/// Decode the fenced block into a JSON value without validating its shape
pub fn decode_plan_block(response: &str) -> Result<Value> {
    let block = extract_json_block(response).map_err(|e| {
        warn!("No JSON block found in planner response");
        e
    })?;
    let value: Value = serde_json::from_str(block).map_err(|e| {
        warn!(error = %e, "Planner JSON did not decode");
        DeskError::PlanDecode(e.to_string())
    })?;
    debug!(plan = %value, "Extracted plan JSON");
    Ok(value)
}

/// Extract, decode and validate a plan
///
/// Returns `PlanNotFound` / `PlanDecode` for planning failures and
/// `InvalidPlan` for shape violations.
pub fn parse_plan_response(response: &str) -> Result<Plan> {
    into_plan(decode_plan_block(response)?)
}
