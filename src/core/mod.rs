//! Core domain models for invocation pipelines
//!
//! This module defines the step contract, the pipeline itself, the
//! per-call context and the configuration they are built from.

pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod step;

pub use context::*;
pub use error::PipelineError;
pub use pipeline::*;
pub use step::*;
