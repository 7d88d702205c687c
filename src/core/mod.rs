pub mod config;
pub mod error;
pub mod types;

pub use config::AssistantConfig;
pub use error::{DeskError, Result};
pub use types::{Arguments, Command, CommandId, Invocation, Plan};
