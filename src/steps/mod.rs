//! Built-in steps
//!
//! Real cross-cutting behaviors (auth, circuit breaking, ...) are plugged in
//! by the embedding runtime. These small steps exist for wiring checks, the
//! command-line tool and tests.

pub mod builtin;

pub use builtin::{EchoStep, LogStep, NoopStep, RejectStep, TagStep};

use crate::core::StepRegistry;

/// Register every built-in step under its default name
pub fn register_builtin(registry: &mut StepRegistry) {
    registry.register(NoopStep::NAME, || NoopStep);
    registry.register(LogStep::NAME, || LogStep);
    registry.register(TagStep::NAME, || TagStep);
    registry.register(RejectStep::NAME, || RejectStep);
    registry.register(EchoStep::NAME, || EchoStep);
}

/// A step registry holding only the built-in steps
pub fn builtin_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    register_builtin(&mut registry);
    registry
}
