//! Outcome reports delivered to the front-end
//!
//! Every command produces reports of a distinguishable kind, so callers can
//! tell a planning failure from a missing tool without parsing message text.
//! `Display` renders the line shown to the user.

use std::fmt;

use serde::Serialize;

use crate::core::types::{Arguments, CommandId};

/// Error text reported when an invocation names an unregistered tool
pub const TOOL_NOT_FOUND: &str = "Tool not found";

/// How a dispatched invocation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The capability reported success
    Succeeded,
    /// No capability registered under the invocation's name
    NotFound,
    /// The capability ran and reported failure without detail
    Failed,
    /// The capability returned an error or panicked
    Errored(String),
}

/// Terminal record for one dispatched invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionOutcome {
    pub command_id: CommandId,
    pub tool: String,
    pub arguments: Arguments,
    pub status: OutcomeStatus,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::NotFound => Some(TOOL_NOT_FOUND),
            OutcomeStatus::Errored(error) => Some(error),
            OutcomeStatus::Succeeded | OutcomeStatus::Failed => None,
        }
    }
}

/// Category of a report, for matching without inspecting text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Rejected,
    PlanningFailure,
    ValidationFailure,
    ToolNotFound,
    ToolExecutionError,
    ToolFailed,
    Succeeded,
    Notice,
}

/// One message in the result stream
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Input was refused before planning (empty command)
    Rejected { reason: String },
    /// The planner failed or returned no usable plan
    PlanningFailed { command_id: CommandId, error: String },
    /// The plan did not have the required shape and was discarded
    InvalidPlan { command_id: CommandId, reason: String },
    /// Final state of one invocation
    Execution(ExecutionOutcome),
    /// Message emitted by background work (timers, reminders, search results)
    Notice { title: String, message: String },
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Rejected { .. } => ReportKind::Rejected,
            Report::PlanningFailed { .. } => ReportKind::PlanningFailure,
            Report::InvalidPlan { .. } => ReportKind::ValidationFailure,
            Report::Notice { .. } => ReportKind::Notice,
            Report::Execution(outcome) => match outcome.status {
                OutcomeStatus::Succeeded => ReportKind::Succeeded,
                OutcomeStatus::NotFound => ReportKind::ToolNotFound,
                OutcomeStatus::Failed => ReportKind::ToolFailed,
                OutcomeStatus::Errored(_) => ReportKind::ToolExecutionError,
            },
        }
    }

    pub fn outcome(&self) -> Option<&ExecutionOutcome> {
        match self {
            Report::Execution(outcome) => Some(outcome),
            _ => None,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Rejected { reason } => write!(f, "{}", reason),
            Report::PlanningFailed { error, .. } => write!(f, "Planner request failed: {}", error),
            Report::InvalidPlan { reason, .. } => write!(f, "Invalid plan: {}", reason),
            Report::Notice { title, message } => write!(f, "[{}] {}", title, message),
            Report::Execution(outcome) if outcome.success() => {
                write!(f, "Tool {} executed successfully.", outcome.tool)
            }
            Report::Execution(outcome) => write!(
                f,
                "Tool {} failed: {}",
                outcome.tool,
                outcome.error().unwrap_or("Unknown error")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: OutcomeStatus) -> ExecutionOutcome {
        ExecutionOutcome {
            command_id: CommandId::new(),
            tool: "set_timer".into(),
            arguments: Arguments::new(),
            status,
        }
    }

    #[test]
    fn test_not_found_reports_fixed_error() {
        let outcome = outcome(OutcomeStatus::NotFound);
        assert!(!outcome.success());
        assert_eq!(outcome.error(), Some("Tool not found"));
        assert_eq!(
            Report::Execution(outcome).to_string(),
            "Tool set_timer failed: Tool not found"
        );
    }

    #[test]
    fn test_failed_without_detail_renders_unknown_error() {
        let report = Report::Execution(outcome(OutcomeStatus::Failed));
        assert_eq!(report.kind(), ReportKind::ToolFailed);
        assert_eq!(report.to_string(), "Tool set_timer failed: Unknown error");
    }

    #[test]
    fn test_kinds_are_distinguishable() {
        let id = CommandId::new();
        let reports = [
            Report::Rejected {
                reason: "No command entered.".into(),
            },
            Report::PlanningFailed {
                command_id: id,
                error: "timeout".into(),
            },
            Report::InvalidPlan {
                command_id: id,
                reason: "missing 'tool_calls'".into(),
            },
            Report::Execution(outcome(OutcomeStatus::Succeeded)),
            Report::Execution(outcome(OutcomeStatus::Errored("disk full".into()))),
        ];
        let kinds: Vec<_> = reports.iter().map(Report::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ReportKind::Rejected,
                ReportKind::PlanningFailure,
                ReportKind::ValidationFailure,
                ReportKind::Succeeded,
                ReportKind::ToolExecutionError,
            ]
        );
        assert_eq!(reports[3].to_string(), "Tool set_timer executed successfully.");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(OutcomeStatus::Errored("boom".into())).unwrap();
        assert_eq!(json, serde_json::json!({"status": "errored", "error": "boom"}));
    }
}
