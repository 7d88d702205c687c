//! Application launching

use std::path::Path;
use std::process::{Child, Command};

use serde_json::json;
use tracing::{debug, warn};

use crate::core::types::Arguments;
use crate::tools::args::{optional_str, required_str};
use crate::tools::registry::CapabilityRegistry;
use crate::tools::{ToolContext, ToolError, ToolResult, ToolSpec};

pub fn register(registry: &mut CapabilityRegistry) {
    registry.register(
        ToolSpec::new(
            "launch_application",
            "Launch an application.",
            json!({
                "type": "object",
                "properties": {
                    "app_path": {"type": "string", "description": "Path to the application"},
                    "arguments": {"type": "string", "description": "Command line arguments"}
                },
                "required": ["app_path"]
            }),
        ),
        launch_application,
    );
}

pub fn launch_application(ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let app_path = Path::new(required_str(args, "app_path")?);
    let app_args = optional_str(args, "arguments")?.unwrap_or("");
    if !app_path.exists() {
        return Err(ToolError::invalid(
            "app_path",
            format!("'{}' does not exist", app_path.display()),
        ));
    }
    debug!(app_path = %app_path.display(), arguments = app_args, "Launching application");

    let child = Command::new(app_path)
        .args(app_args.split_whitespace())
        .spawn()?;

    // Reap the child without holding up stop: polling stops on cancel and the
    // application keeps running.
    let pid = child.id();
    ctx.spawn_background("app-reaper", move |ctx| reap(ctx, child, pid))?;
    Ok(true)
}

fn reap(ctx: ToolContext, mut child: Child, pid: u32) {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid, %status, "Application exited");
                return;
            }
            Ok(None) => {
                if !ctx.sleep(ctx.poll_interval()) {
                    return;
                }
            }
            Err(e) => {
                warn!(pid, error = %e, "Lost track of application");
                return;
            }
        }
    }
}
