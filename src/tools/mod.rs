//! Capabilities the planner can invoke
//!
//! A capability takes a [`ToolContext`] and the invocation's argument map and
//! returns `Ok(success)` or a [`ToolError`]. Capabilities live in an
//! immutable [`CapabilityRegistry`] built once at startup.

pub mod apps;
pub mod archive;
pub mod args;
pub mod builtin;
pub mod context;
pub mod duration;
pub mod files;
pub mod registry;
pub mod timers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::DeskError;

pub use context::ToolContext;
pub use duration::{parse_duration, parse_duration_secs};
pub use registry::{Capability, CapabilityRegistry, Tool};

/// Errors raised by a capability while it runs
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Missing argument '{0}'")]
    MissingArgument(&'static str),

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Desk(#[from] DeskError),

    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ToolError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// What a capability returns: `Ok(success)` or an error
pub type ToolResult = std::result::Result<bool, ToolError>;

/// Catalog entry shown to the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the argument object
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}
