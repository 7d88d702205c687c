//! Typed accessors for planner-supplied arguments
//!
//! Planners are loose with types, so numbers and booleans are also accepted
//! in string form. `null` counts as absent.

use serde_json::Value;

use crate::core::types::Arguments;
use crate::tools::ToolError;

fn present<'a>(args: &'a Arguments, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|value| !value.is_null())
}

pub fn required_str<'a>(args: &'a Arguments, name: &'static str) -> Result<&'a str, ToolError> {
    optional_str(args, name)?.ok_or(ToolError::MissingArgument(name))
}

pub fn optional_str<'a>(
    args: &'a Arguments,
    name: &'static str,
) -> Result<Option<&'a str>, ToolError> {
    match present(args, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ToolError::invalid(name, format!("expected a string, got {}", other))),
    }
}

pub fn optional_u64(args: &Arguments, name: &'static str) -> Result<Option<u64>, ToolError> {
    match present(args, name) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| ToolError::invalid(name, format!("expected a non-negative integer, got {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ToolError::invalid(name, format!("expected a non-negative integer, got '{}'", s))),
        Some(other) => Err(ToolError::invalid(name, format!("expected an integer, got {}", other))),
    }
}

pub fn optional_bool(args: &Arguments, name: &'static str) -> Result<Option<bool>, ToolError> {
    match present(args, name) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Ok(Some(true)),
            "false" | "no" => Ok(Some(false)),
            _ => Err(ToolError::invalid(name, format!("expected a boolean, got '{}'", s))),
        },
        Some(other) => Err(ToolError::invalid(name, format!("expected a boolean, got {}", other))),
    }
}

/// A list of strings; a single string is taken as a one-element list
pub fn required_str_list<'a>(
    args: &'a Arguments,
    name: &'static str,
) -> Result<Vec<&'a str>, ToolError> {
    match present(args, name) {
        None => Err(ToolError::MissingArgument(name)),
        Some(Value::String(s)) => Ok(vec![s.as_str()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or_else(|| {
                    ToolError::invalid(name, format!("expected strings, got {}", item))
                })
            })
            .collect(),
        Some(other) => Err(ToolError::invalid(name, format!("expected a list, got {}", other))),
    }
}
