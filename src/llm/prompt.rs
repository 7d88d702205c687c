//! Prompt construction for plan generation
//!
//! The catalog is rendered in the compact function-calling format
//! (`name`, `description`, and the schema's `properties` as `parameters`)
//! and wrapped in task / tools / format / query sections.

use serde::Serialize;
use serde_json::Value;

use crate::tools::ToolSpec;

/// Catalog entry in the compact format shown to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactTool<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub parameters: Value,
}

impl<'a> From<&'a ToolSpec> for CompactTool<'a> {
    fn from(spec: &'a ToolSpec) -> Self {
        let parameters = spec
            .parameters
            .get("properties")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        Self {
            name: &spec.name,
            description: &spec.description,
            parameters,
        }
    }
}

pub fn compact_catalog(catalog: &[ToolSpec]) -> Vec<CompactTool<'_>> {
    catalog.iter().map(CompactTool::from).collect()
}

/// System prompt: role and output contract
pub const PLAN_SYSTEM_PROMPT: &str = r#"You are an expert in composing functions for a desktop automation assistant.
Translate the user's command into tool calls using ONLY the tools listed in the
AVAILABLE TOOLS section. Use the argument names exactly as listed and make sure
every argument has the right type.

OUTPUT FORMAT (a single fenced JSON block, no other text):
```json
{
    "tool_calls": [
        {"name": "func_name1", "arguments": {"argument1": "value1", "argument2": "value2"}},
        ... (more tool calls as required)
    ]
}
```

If no tool call is needed, return "tool_calls" as an empty list []."#;

/// User prompt: the catalog followed by the query
pub fn plan_user_prompt(command: &str, catalog: &[ToolSpec]) -> String {
    let tools = serde_json::to_string(&compact_catalog(catalog)).unwrap_or_else(|_| "[]".into());
    format!(
        "[BEGIN OF AVAILABLE TOOLS]\n{}\n[END OF AVAILABLE TOOLS]\n\n[BEGIN OF QUERY]\n{}\n[END OF QUERY]",
        tools, command
    )
}
