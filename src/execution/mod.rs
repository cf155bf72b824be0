//! Pipeline construction, registration and traversal

pub mod builder;
pub mod engine;
pub mod registry;

pub use builder::{BuildReport, PipelineBuilder};
pub use engine::{invoke, Chain, Completion, Continuation};
pub use registry::{PipelineRegistry, RegistryKey, DEFAULT_PIPELINE_NAME};
