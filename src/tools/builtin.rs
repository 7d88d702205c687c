//! The default tool set

use crate::tools::registry::CapabilityRegistry;
use crate::tools::{apps, archive, files, timers};

/// Registry holding every built-in tool
pub fn registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    timers::register(&mut registry);
    files::register(&mut registry);
    archive::register(&mut registry);
    apps::register(&mut registry);
    registry
}
