//! Pipeline configuration from YAML

use crate::core::pipeline::TraversalMode;
use crate::core::step::StepRegistry;
use crate::execution::registry::DEFAULT_PIPELINE_NAME;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration: step lists per pipeline, grouped by service type
///
/// ```yaml
/// default_pipeline: default
/// mode: concurrent
/// pipelines:
///   Consumer:
///     default: "auth, trace, loadbalance"
///   Provider:
///     default: "trace"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelinesConfig {
    /// Pipeline used when a lookup names none
    #[serde(default = "default_pipeline_name")]
    pub default_pipeline: String,

    /// Scheduling applied to every built pipeline
    #[serde(default)]
    pub mode: TraversalMode,

    /// service type -> pipeline name -> comma-separated step names
    #[serde(default)]
    pub pipelines: BTreeMap<String, BTreeMap<String, String>>,
}

fn default_pipeline_name() -> String {
    DEFAULT_PIPELINE_NAME.to_string()
}

impl Default for PipelinesConfig {
    fn default() -> Self {
        Self {
            default_pipeline: default_pipeline_name(),
            mode: TraversalMode::default(),
            pipelines: BTreeMap::new(),
        }
    }
}

impl PipelinesConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelinesConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_pipeline.trim().is_empty() {
            anyhow::bail!("default_pipeline must not be empty");
        }

        for (service_type, pipelines) in &self.pipelines {
            if service_type.trim().is_empty() {
                anyhow::bail!("Service type must not be empty");
            }
            for name in pipelines.keys() {
                if name.trim().is_empty() {
                    anyhow::bail!("Pipeline name under '{}' must not be empty", service_type);
                }
            }
        }

        Ok(())
    }

    /// Parsed step names for one pipeline, if configured
    pub fn step_names(&self, service_type: &str, name: &str) -> Option<Vec<String>> {
        self.pipelines
            .get(service_type)
            .and_then(|pipelines| pipelines.get(name))
            .map(|list| parse_step_names(list))
    }

    /// Every configured step name `steps` cannot resolve
    ///
    /// Returns `(service_type, pipeline, step)` triples in config order.
    /// Unlike a build, which stops at the first unresolved name, this lists
    /// them all.
    pub fn unknown_steps(&self, steps: &StepRegistry) -> Vec<(String, String, String)> {
        let mut unknown = Vec::new();
        for (service_type, pipelines) in &self.pipelines {
            for name in pipelines.keys() {
                for step in self.step_names(service_type, name).unwrap_or_default() {
                    if !steps.contains(&step) {
                        unknown.push((service_type.clone(), name.clone(), step));
                    }
                }
            }
        }
        unknown
    }
}

/// Split a comma-separated step list
///
/// All whitespace is removed before splitting, including whitespace inside a
/// name, so `"a u t h,trace"` parses like `"auth,trace"`. Empty tokens are
/// dropped.
pub fn parse_step_names(list: &str) -> Vec<String> {
    let compact: String = list.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .split(',')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
