//! Pipeline domain model

use crate::core::step::Step;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// How concurrent calls sharing one pipeline are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMode {
    /// Calls traverse independently; the cursor is call-local
    #[default]
    Concurrent,
    /// One traversal at a time: a call holds the pipeline until its
    /// continuation has fired, queueing every other call behind it
    Serialized,
}

/// An ordered list of steps for a given service type and name
pub struct Pipeline {
    /// Service type tag (e.g. "Consumer" or "Provider")
    pub service_type: String,

    /// Pipeline name
    pub name: String,

    /// Steps in configuration order
    steps: Vec<Arc<dyn Step>>,

    /// Scheduling of concurrent traversals
    mode: TraversalMode,

    /// Held for a whole traversal in serialized mode
    gate: Mutex<()>,

    /// Identifies `gate` to calls already holding it
    gate_id: Uuid,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new(service_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            name: name.into(),
            steps: Vec::new(),
            mode: TraversalMode::default(),
            gate: Mutex::new(()),
            gate_id: Uuid::new_v4(),
        }
    }

    /// Set the traversal mode
    pub fn with_mode(mut self, mode: TraversalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Append a step to the end of the pipeline
    pub fn add_step(&mut self, step: Arc<dyn Step>) {
        self.steps.push(step);
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[Arc<dyn Step>] {
        &self.steps
    }

    /// Names of the steps in execution order
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn mode(&self) -> TraversalMode {
        self.mode
    }

    pub(crate) fn gate(&self) -> &Mutex<()> {
        &self.gate
    }

    pub(crate) fn gate_id(&self) -> Uuid {
        self.gate_id
    }
}

/// Shallow copy: step instances are shared, the step list is not.
impl Clone for Pipeline {
    fn clone(&self) -> Self {
        Self {
            service_type: self.service_type.clone(),
            name: self.name.clone(),
            steps: self.steps.clone(),
            mode: self.mode,
            gate: Mutex::new(()),
            gate_id: Uuid::new_v4(),
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("service_type", &self.service_type)
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .field("mode", &self.mode)
            .finish()
    }
}
