//! invoke-chain - configurable invocation pipelines for RPC runtimes

pub mod cli;
pub mod core;
pub mod execution;
pub mod steps;

// Re-export commonly used types
pub use crate::core::{CallContext, Pipeline, PipelineError, Response, Step, StepRegistry, StepResolver, TraversalMode};
pub use crate::core::config::{parse_step_names, PipelinesConfig};
pub use crate::execution::{invoke, BuildReport, Chain, Completion, Continuation, PipelineBuilder, PipelineRegistry};
