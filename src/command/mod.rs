//! Command pipeline
//!
//! Command text -> Orchestrator -> Planner -> validated Plan -> Dispatcher
//! -> one worker per Invocation -> Report on the result stream

pub mod dispatch;
pub mod orchestrator;
pub mod outcome;
pub mod sink;

pub use dispatch::Dispatcher;
pub use orchestrator::Orchestrator;
pub use outcome::{ExecutionOutcome, OutcomeStatus, Report, ReportKind};
pub use sink::{ResultSink, ResultStream};
