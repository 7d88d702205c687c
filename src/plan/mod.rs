//! Plan validation
//!
//! Planner output is untrusted: it is checked structurally here before any
//! invocation reaches the capability registry.

pub mod validator;

pub use validator::{into_plan, validate_plan, violation};
