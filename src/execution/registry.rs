//! Pipeline registry - the process-wide table of compiled pipelines

use crate::core::{error::PipelineError, pipeline::Pipeline};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Name substituted when a lookup does not name a pipeline
pub const DEFAULT_PIPELINE_NAME: &str = "default";

/// Registry key: a (service type, pipeline name) pair
///
/// Kept as two fields so distinct pairs never collide; displayed as
/// `service_type.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryKey {
    pub service_type: String,
    pub name: String,
}

impl RegistryKey {
    pub fn new(service_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service_type, self.name)
    }
}

/// Compiled pipelines keyed by service type and name
///
/// Filled once at startup and read by every call afterwards. Entries are
/// shared, never copied per call, and there is no removal.
#[derive(Debug)]
pub struct PipelineRegistry {
    pipelines: RwLock<HashMap<RegistryKey, Arc<Pipeline>>>,
    default_name: String,
}

impl PipelineRegistry {
    /// Create an empty registry using [`DEFAULT_PIPELINE_NAME`]
    pub fn new() -> Self {
        Self::with_default_name(DEFAULT_PIPELINE_NAME)
    }

    /// Create an empty registry with a custom default pipeline name
    pub fn with_default_name(default_name: impl Into<String>) -> Self {
        Self {
            pipelines: RwLock::new(HashMap::new()),
            default_name: default_name.into(),
        }
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Insert a pipeline, replacing any entry under the same key
    pub fn register(
        &self,
        service_type: impl Into<String>,
        name: impl Into<String>,
        pipeline: Pipeline,
    ) -> Arc<Pipeline> {
        let key = RegistryKey::new(service_type, name);
        let pipeline = Arc::new(pipeline);
        let previous = self
            .pipelines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), pipeline.clone());

        if previous.is_some() {
            debug!(key = %key, "Replaced registered pipeline");
        }
        pipeline
    }

    /// Look up a pipeline; an empty `name` selects the default pipeline
    pub fn lookup(&self, service_type: &str, name: &str) -> Result<Arc<Pipeline>, PipelineError> {
        let name = if name.is_empty() { self.default_name.as_str() } else { name };
        let key = RegistryKey::new(service_type, name);

        self.pipelines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .ok_or_else(|| PipelineError::NotFound(key.to_string()))
    }

    /// All registered keys, sorted
    pub fn keys(&self) -> Vec<RegistryKey> {
        let mut keys: Vec<RegistryKey> = self
            .pipelines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.pipelines.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
