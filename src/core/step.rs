//! Step capability contract and the name-to-factory step registry

use crate::core::{context::CallContext, error::PipelineError};
use crate::execution::engine::{Chain, Completion};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One unit of cross-cutting call handling (auth, tracing, load-balancing, ...)
///
/// A step decides control flow explicitly by consuming the [`Chain`] it is
/// handed:
/// - [`Chain::proceed`] runs the remaining steps
/// - [`Chain::proceed_with`] runs them and sees their response on the way back
/// - [`Chain::complete`] delivers a response and skips the rest of the pipeline
///
/// Either call yields the [`Completion`] the step must return, so every
/// execution ends the call or passes it on exactly once.
pub trait Step: Send + Sync {
    /// Name the step is registered under
    fn name(&self) -> &str;

    /// Handle the call and decide whether the pipeline continues
    fn execute(&self, ctx: &mut CallContext, chain: Chain<'_>) -> Completion;
}

impl fmt::Debug for dyn Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Step").field(&self.name()).finish()
    }
}

/// Zero-argument factory producing a fresh step instance
pub type StepFactory = Arc<dyn Fn() -> Arc<dyn Step> + Send + Sync>;

/// Trait for step resolution - the boundary the pipeline builder depends on
pub trait StepResolver: Send + Sync {
    /// Produce a new step instance for `name`
    fn resolve(&self, name: &str) -> Result<Arc<dyn Step>, PipelineError>;
}

/// Process-wide table of step factories keyed by registered name
#[derive(Clone, Default)]
pub struct StepRegistry {
    factories: HashMap<String, StepFactory>,
}

impl StepRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<F, S>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Step + 'static,
    {
        let factory: StepFactory = Arc::new(move || Arc::new(factory()) as Arc<dyn Step>);
        self.factories.insert(name.into(), factory);
    }

    /// Builder-style variant of [`register`](Self::register)
    pub fn with_step<F, S>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Step + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Check whether a factory exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// All registered step names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl StepResolver for StepRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<dyn Step>, PipelineError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| PipelineError::StepNotFound(name.to_string()))
    }
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("names", &self.names())
            .finish()
    }
}
