//! Planner implementations
//!
//! A planner turns a command and the tool catalog into raw response text;
//! the orchestrator extracts and validates the plan from it.

use tokio::runtime::Handle;
use tracing::debug;

use crate::core::error::Result;
use crate::llm::client::LlmClient;
use crate::llm::prompt::{plan_user_prompt, PLAN_SYSTEM_PROMPT};
use crate::tools::ToolSpec;

/// Source of plans, called from the orchestrator thread
pub trait Planner: Send + 'static {
    fn plan(&self, command: &str, catalog: &[ToolSpec]) -> Result<String>;
}

impl<F> Planner for F
where
    F: Fn(&str, &[ToolSpec]) -> Result<String> + Send + 'static,
{
    fn plan(&self, command: &str, catalog: &[ToolSpec]) -> Result<String> {
        self(command, catalog)
    }
}

/// Plans by asking a language model
pub struct LlmPlanner {
    client: LlmClient,
    runtime: Handle,
}

impl LlmPlanner {
    /// `runtime` drives the HTTP calls; `plan` must not be called from
    /// inside that runtime.
    pub fn new(client: LlmClient, runtime: Handle) -> Self {
        Self { client, runtime }
    }
}

impl Planner for LlmPlanner {
    fn plan(&self, command: &str, catalog: &[ToolSpec]) -> Result<String> {
        let user_prompt = plan_user_prompt(command, catalog);
        debug!(model = %self.client.model(), tools = catalog.len(), "Requesting plan");

        let response = self
            .runtime
            .block_on(self.client.complete(PLAN_SYSTEM_PROMPT, &user_prompt))?;
        debug!(response = %response, "Planner response");
        Ok(response)
    }
}

/// Uses the command text itself as the planner response
///
/// Lets a user type a fenced JSON plan directly when no model is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughPlanner;

impl Planner for PassthroughPlanner {
    fn plan(&self, command: &str, _catalog: &[ToolSpec]) -> Result<String> {
        Ok(command.to_string())
    }
}
