//! Language-model planning
//!
//! The model only translates commands into tool calls; it never executes
//! anything itself.

pub mod client;
pub mod parser;
pub mod planner;
pub mod prompt;

pub use client::LlmClient;
pub use parser::parse_plan_response;
pub use planner::{LlmPlanner, PassthroughPlanner, Planner};
