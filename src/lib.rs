//! Deskhand - natural-language desktop assistant
//!
//! Commands are planned into tool calls by a language model, validated, and
//! executed concurrently on worker threads. Every outcome is reported on a
//! single result stream.

pub mod command;
pub mod core;
pub mod llm;
pub mod plan;
pub mod shutdown;
pub mod tools;
pub mod worker;
