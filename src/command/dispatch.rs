//! Invocation dispatch - registry lookup plus one worker per invocation

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::command::outcome::{ExecutionOutcome, OutcomeStatus, Report};
use crate::command::sink::ResultSink;
use crate::core::config::WorkerConfig;
use crate::core::types::{Arguments, CommandId, Invocation, Plan};
use crate::tools::{CapabilityRegistry, Tool, ToolContext};
use crate::worker::{WorkerId, WorkerManager};

/// Routes invocations to capabilities on worker threads
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    workers: WorkerManager,
    sink: ResultSink,
    tools: ToolContext,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        workers: WorkerManager,
        sink: ResultSink,
        config: &WorkerConfig,
    ) -> Self {
        let tools = ToolContext::new(workers.clone(), sink.clone(), config);
        Self {
            registry,
            workers,
            sink,
            tools,
        }
    }

    /// Dispatch every invocation of `plan` in order, returning the number of
    /// workers started
    pub fn dispatch_plan(&self, command_id: CommandId, plan: Plan) -> usize {
        plan.tool_calls
            .into_iter()
            .filter_map(|invocation| self.dispatch(command_id, invocation))
            .count()
    }

    /// Dispatch one invocation without waiting for it
    ///
    /// Unknown tools are answered immediately with a `NotFound` outcome and
    /// no worker. Otherwise the outcome is pushed by the worker when the
    /// capability returns.
    pub fn dispatch(&self, command_id: CommandId, invocation: Invocation) -> Option<WorkerId> {
        let Invocation { name, arguments } = invocation;

        let Some(tool) = self.registry.lookup(&name) else {
            warn!(command_id = %command_id, tool = %name, "Tool not found");
            self.sink.push(outcome(command_id, name, arguments, OutcomeStatus::NotFound));
            return None;
        };

        let tool = tool.clone();
        let ctx = self.tools.clone();
        let sink = self.sink.clone();
        let tool_name = name.clone();
        let spawn_arguments = arguments.clone();

        let spawned = self.workers.spawn(&name, move |_| {
            debug!(command_id = %command_id, tool = %tool_name, "Executing tool");
            let status = run_capability(&tool, &ctx, &spawn_arguments);
            debug!(command_id = %command_id, tool = %tool_name, ?status, "Tool finished");
            sink.push(outcome(command_id, tool_name, spawn_arguments, status));
        });

        match spawned {
            Ok(id) => Some(id),
            Err(e) => {
                error!(command_id = %command_id, tool = %name, error = %e, "Could not start worker");
                let status = OutcomeStatus::Errored(e.to_string());
                self.sink.push(outcome(command_id, name, arguments, status));
                None
            }
        }
    }
}

fn outcome(
    command_id: CommandId,
    tool: String,
    arguments: Arguments,
    status: OutcomeStatus,
) -> Report {
    Report::Execution(ExecutionOutcome {
        command_id,
        tool,
        arguments,
        status,
    })
}

/// Run a capability, turning errors and panics into an outcome status
pub fn run_capability(tool: &Tool, ctx: &ToolContext, arguments: &Arguments) -> OutcomeStatus {
    match panic::catch_unwind(AssertUnwindSafe(|| tool.invoke(ctx, arguments))) {
        Ok(Ok(true)) => OutcomeStatus::Succeeded,
        Ok(Ok(false)) => OutcomeStatus::Failed,
        Ok(Err(e)) => {
            warn!(tool = %tool.name(), error = %e, "Tool returned an error");
            OutcomeStatus::Errored(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(tool = %tool.name(), panic = %message, "Tool panicked");
            OutcomeStatus::Errored(format!("Tool panicked: {}", message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::outcome::{ReportKind, TOOL_NOT_FOUND};
    use crate::command::sink;
    use crate::tools::{ToolError, ToolSpec};
    use serde_json::json;
    use std::time::Duration;

    fn registry() -> Arc<CapabilityRegistry> {
        let mut registry = CapabilityRegistry::new();
        let schema = json!({"type": "object", "properties": {}});
        registry.register(ToolSpec::new("ok", "", schema.clone()), |_, _| Ok(true));
        registry.register(ToolSpec::new("no", "", schema.clone()), |_, _| Ok(false));
        registry.register(ToolSpec::new("err", "", schema.clone()), |_, _| {
            Err(ToolError::Failed("disk full".into()))
        });
        registry.register(ToolSpec::new("boom", "", schema), |_, _| panic!("kaboom"));
        Arc::new(registry)
    }

    fn run(name: &str) -> Report {
        let (sink, stream) = sink::channel();
        let workers = WorkerManager::new();
        let dispatcher = Dispatcher::new(registry(), workers.clone(), sink, &WorkerConfig::default());
        dispatcher.dispatch(CommandId::new(), Invocation::new(name, Arguments::new()));
        let report = stream.recv_timeout(Duration::from_secs(5)).unwrap();
        workers.stop_all();
        report
    }

    #[test]
    fn test_unknown_tool_spawns_nothing() {
        let (sink, stream) = sink::channel();
        let workers = WorkerManager::new();
        let dispatcher = Dispatcher::new(registry(), workers.clone(), sink, &WorkerConfig::default());

        let mut arguments = Arguments::new();
        arguments.insert("x".into(), json!(1));
        let spawned = dispatcher.dispatch(CommandId::new(), Invocation::new("nope", arguments.clone()));

        assert!(spawned.is_none());
        assert_eq!(workers.active_count(), 0);
        let report = stream.try_recv().unwrap();
        let outcome = report.outcome().unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.error(), Some(TOOL_NOT_FOUND));
        assert_eq!(outcome.arguments, arguments);
        assert!(stream.try_recv().is_none());
    }

    #[test]
    fn test_success_mirrors_capability() {
        assert_eq!(run("ok").kind(), ReportKind::Succeeded);
        assert_eq!(run("no").kind(), ReportKind::ToolFailed);
    }

    #[test]
    fn test_error_is_captured() {
        let report = run("err");
        assert_eq!(report.kind(), ReportKind::ToolExecutionError);
        assert_eq!(report.outcome().unwrap().error(), Some("disk full"));
    }

    #[test]
    fn test_panic_is_captured() {
        let report = run("boom");
        assert_eq!(report.kind(), ReportKind::ToolExecutionError);
        assert_eq!(report.outcome().unwrap().error(), Some("Tool panicked: kaboom"));
    }

    #[test]
    fn test_dispatch_plan_counts_workers() {
        let (sink, stream) = sink::channel();
        let workers = WorkerManager::new();
        let dispatcher = Dispatcher::new(registry(), workers.clone(), sink, &WorkerConfig::default());
        let plan = Plan {
            tool_calls: vec![
                Invocation::new("ok", Arguments::new()),
                Invocation::new("missing", Arguments::new()),
                Invocation::new("no", Arguments::new()),
            ],
        };

        assert_eq!(dispatcher.dispatch_plan(CommandId::new(), plan), 2);
        let reports: Vec<_> = (0..3)
            .map(|_| stream.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(reports.len(), 3);
        workers.stop_all();
    }
}
