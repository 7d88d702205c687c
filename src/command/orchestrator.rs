//! Command intake and planning loop
//!
//! A single consumer thread takes commands one at a time, asks the planner
//! for a plan, validates it and hands each invocation to the dispatcher.
//! Planning is sequential; execution is not: the loop never waits for a
//! plan's invocations before taking the next command.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, info_span, warn};

use crate::command::dispatch::Dispatcher;
use crate::command::outcome::Report;
use crate::command::sink::ResultSink;
use crate::core::config::WorkerConfig;
use crate::core::error::{DeskError, Result};
use crate::core::types::{Command, CommandId};
use crate::llm::parser::parse_plan_response;
use crate::llm::planner::Planner;
use crate::tools::{CapabilityRegistry, ToolSpec};
use crate::worker::WorkerManager;

/// Text of the report for an empty submission
pub const EMPTY_COMMAND: &str = "No command entered.";

/// Handle to the running planning loop
pub struct Orchestrator {
    commands: Option<Sender<Command>>,
    sink: ResultSink,
    thread: Option<JoinHandle<()>>,
}

impl Orchestrator {
    /// Start the planning loop on its own thread
    pub fn spawn<P: Planner>(
        planner: P,
        registry: Arc<CapabilityRegistry>,
        workers: WorkerManager,
        sink: ResultSink,
        config: &WorkerConfig,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let catalog = registry.catalog();
        let dispatcher = Dispatcher::new(registry, workers, sink.clone(), config);
        let loop_sink = sink.clone();

        let thread = thread::Builder::new()
            .name("orchestrator".into())
            .spawn(move || run_loop(planner, rx, catalog, dispatcher, loop_sink))?;

        Ok(Self {
            commands: Some(tx),
            sink,
            thread: Some(thread),
        })
    }

    /// Queue a command for planning; never blocks
    ///
    /// Empty input is answered with a `Rejected` report and not queued.
    pub fn submit(&self, text: impl Into<String>) -> Option<CommandId> {
        let text = text.into();
        if text.trim().is_empty() {
            self.sink.push(Report::Rejected {
                reason: EMPTY_COMMAND.into(),
            });
            return None;
        }

        let command = Command::new(text);
        let id = command.id();
        let queued = self
            .commands
            .as_ref()
            .is_some_and(|tx| tx.send(command).is_ok());

        if queued {
            debug!(command_id = %id, "Command queued");
            Some(id)
        } else {
            warn!(command_id = %id, "Planning loop is gone, dropping command");
            self.sink.push(Report::Rejected {
                reason: DeskError::Closed.to_string(),
            });
            None
        }
    }

    /// Close intake and wait for queued commands to be planned
    ///
    /// Does not wait for dispatched invocations; that is the worker
    /// manager's job.
    pub fn shutdown(mut self) {
        self.commands.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Planning loop panicked");
            }
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        // Closing the channel ends the loop once the queue is drained.
        self.commands.take();
    }
}

fn run_loop<P: Planner>(
    planner: P,
    commands: Receiver<Command>,
    catalog: Vec<ToolSpec>,
    dispatcher: Dispatcher,
    sink: ResultSink,
) {
    info!(tools = catalog.len(), "Planning loop started");
    while let Ok(command) = commands.recv() {
        process_command(&planner, &catalog, &dispatcher, &sink, command);
    }
    info!("Planning loop stopped");
}

/// Plan, validate and dispatch one command
///
/// Every failure becomes exactly one report; nothing here ends the loop.
pub fn process_command<P: Planner>(
    planner: &P,
    catalog: &[ToolSpec],
    dispatcher: &Dispatcher,
    sink: &ResultSink,
    command: Command,
) {
    let command_id = command.id();
    let span = info_span!("command", command_id = %command_id);
    let _enter = span.enter();
    info!(text = command.text(), "Planning command");

    let planned = panic::catch_unwind(AssertUnwindSafe(|| planner.plan(command.text(), catalog)))
        .unwrap_or_else(|_| Err(DeskError::LlmError("planner panicked".into())));

    let response = match planned {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Planner request failed");
            sink.push(Report::PlanningFailed {
                command_id,
                error: e.to_string(),
            });
            return;
        }
    };

    let plan = match parse_plan_response(&response) {
        Ok(plan) => plan,
        Err(DeskError::InvalidPlan(reason)) => {
            warn!(reason = %reason, "Plan rejected");
            sink.push(Report::InvalidPlan { command_id, reason });
            return;
        }
        Err(e) => {
            sink.push(Report::PlanningFailed {
                command_id,
                error: e.to_string(),
            });
            return;
        }
    };

    if plan.is_empty() {
        info!("Plan has no tool calls");
        return;
    }

    let spawned = dispatcher.dispatch_plan(command_id, plan);
    debug!(workers = spawned, "Plan dispatched");
}
