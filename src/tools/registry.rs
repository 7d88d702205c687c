//! Name-to-capability registry
//!
//! Filled once at startup, then shared read-only behind an `Arc`. Lookup of
//! an unknown name is an ordinary `None`, never a panic.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::core::types::Arguments;
use crate::tools::{ToolContext, ToolResult, ToolSpec};

/// Executable body of a tool
pub type Capability = Arc<dyn Fn(&ToolContext, &Arguments) -> ToolResult + Send + Sync>;

/// A registered tool: catalog entry plus capability
#[derive(Clone)]
pub struct Tool {
    spec: ToolSpec,
    capability: Capability,
}

impl Tool {
    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn invoke(&self, ctx: &ToolContext, arguments: &Arguments) -> ToolResult {
        (self.capability)(ctx, arguments)
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool").field("spec", &self.spec).finish()
    }
}

/// Registry of tools in registration order
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    tools: Vec<Tool>,
    by_name: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a second registration under the same name replaces
    /// the first
    pub fn register<F>(&mut self, spec: ToolSpec, capability: F)
    where
        F: Fn(&ToolContext, &Arguments) -> ToolResult + Send + Sync + 'static,
    {
        let tool = Tool {
            spec,
            capability: Arc::new(capability),
        };

        match self.by_name.get(tool.name()) {
            Some(&index) => {
                warn!(tool = %tool.name(), "Replacing previously registered tool");
                self.tools[index] = tool;
            }
            None => {
                self.by_name.insert(tool.name().to_string(), self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Tool> {
        self.by_name.get(name).map(|&index| &self.tools[index])
    }

    /// Catalog handed to the planner
    pub fn catalog(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec.clone()).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(Tool::name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
