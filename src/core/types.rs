//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Argument map handed to a tool
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// Unique identifier for a submitted command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub Uuid);

impl CommandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw natural-language instruction, immutable once enqueued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    id: CommandId,
    text: String,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: CommandId::new(),
            text: text.into(),
        }
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One named tool call with its argument map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub name: String,
    pub arguments: Arguments,
}

impl Invocation {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Validated list of invocations derived from one command
///
/// Serializes to the planner wire format: `{"tool_calls": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub tool_calls: Vec<Invocation>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tool_calls.len()
    }
}
