//! Error types for pipeline construction and lookup

use thiserror::Error;

/// Errors raised while building, registering or looking up pipelines.
///
/// Failures reported by steps themselves never show up here: they travel
/// as opaque payload inside [`Response::err`](crate::core::Response).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No factory is registered under the requested step name
    #[error("no step registered under name '{0}'")]
    StepNotFound(String),

    /// A pipeline could not be built because one of its steps failed to resolve
    #[error("failed to create pipeline {service_type}.{pipeline}:{steps:?}: {source}")]
    Build {
        service_type: String,
        pipeline: String,
        steps: Vec<String>,
        #[source]
        source: Box<PipelineError>,
    },

    /// Lookup of a key that was never registered
    #[error("get pipeline [{0}] failed: not registered")]
    NotFound(String),

    /// The traversal ended without its continuation firing
    #[error("invocation aborted: {0}")]
    Aborted(String),
}
