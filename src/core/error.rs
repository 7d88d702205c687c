use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("No plan found in planner response")]
    PlanNotFound,

    #[error("Plan decode error: {0}")]
    PlanDecode(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to spawn worker '{label}': {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Orchestrator is no longer accepting commands")]
    Closed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DeskError>;
