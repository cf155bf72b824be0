//! Pipeline builder - compiles configured step lists into registered pipelines

use crate::core::{
    config::{parse_step_names, PipelinesConfig},
    error::PipelineError,
    pipeline::{Pipeline, TraversalMode},
    step::StepResolver,
};
use crate::execution::registry::{PipelineRegistry, RegistryKey};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Outcome of building a batch of pipelines
///
/// One bad pipeline never stops its siblings, so successes and failures
/// are collected side by side.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Keys of pipelines built and registered
    pub registered: Vec<RegistryKey>,

    /// One error per pipeline that failed to build
    pub errors: Vec<PipelineError>,
}

impl BuildReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: BuildReport) {
        self.registered.extend(other.registered);
        self.errors.extend(other.errors);
    }

    /// Registered keys, or every build error if any pipeline failed
    pub fn into_result(self) -> Result<Vec<RegistryKey>, Vec<PipelineError>> {
        if self.errors.is_empty() {
            Ok(self.registered)
        } else {
            Err(self.errors)
        }
    }
}

/// Resolves step names and wires them into pipelines
pub struct PipelineBuilder<'a> {
    resolver: &'a dyn StepResolver,
    mode: TraversalMode,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(resolver: &'a dyn StepResolver) -> Self {
        Self {
            resolver,
            mode: TraversalMode::default(),
        }
    }

    /// Traversal mode given to every pipeline this builder creates
    pub fn with_mode(mut self, mode: TraversalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build one pipeline from already-parsed step names
    pub fn build(
        &self,
        service_type: &str,
        name: &str,
        step_names: &[String],
    ) -> Result<Pipeline, PipelineError> {
        let mut pipeline = Pipeline::new(service_type, name).with_mode(self.mode);
        for step_name in step_names {
            let step = self.resolver.resolve(step_name).map_err(|e| PipelineError::Build {
                service_type: service_type.to_string(),
                pipeline: name.to_string(),
                steps: step_names.to_vec(),
                source: Box::new(e),
            })?;
            pipeline.add_step(step);
        }

        debug!(
            service_type,
            pipeline = name,
            steps = pipeline.len(),
            "Pipeline built"
        );
        if pipeline.is_empty() {
            warn!(service_type, pipeline = name, "Pipeline is empty");
        }
        Ok(pipeline)
    }

    /// Build every pipeline of one service type and register the successes
    ///
    /// `step_lists` maps pipeline name to its comma-separated step list.
    pub fn build_all(
        &self,
        service_type: &str,
        step_lists: &BTreeMap<String, String>,
        registry: &PipelineRegistry,
    ) -> BuildReport {
        let mut report = BuildReport::default();

        for (name, list) in step_lists {
            let step_names = parse_step_names(list);
            match self.build(service_type, name, &step_names) {
                Ok(pipeline) => {
                    registry.register(service_type, name.as_str(), pipeline);
                    report.registered.push(RegistryKey::new(service_type, name.as_str()));
                }
                Err(e) => {
                    warn!(service_type, pipeline = %name, error = %e, "Pipeline build failed");
                    report.errors.push(e);
                }
            }
        }

        report
    }

    /// Build every pipeline in a configuration
    pub fn load(&self, config: &PipelinesConfig, registry: &PipelineRegistry) -> BuildReport {
        let mut report = BuildReport::default();
        for (service_type, step_lists) in &config.pipelines {
            report.merge(self.build_all(service_type, step_lists, registry));
        }
        report
    }
}

impl PipelineRegistry {
    /// Build and register the pipelines of one service type
    pub fn create_pipelines(
        &self,
        service_type: &str,
        step_lists: &BTreeMap<String, String>,
        resolver: &dyn StepResolver,
    ) -> BuildReport {
        PipelineBuilder::new(resolver).build_all(service_type, step_lists, self)
    }

    /// Create a registry holding every pipeline a configuration describes
    pub fn from_config(config: &PipelinesConfig, resolver: &dyn StepResolver) -> (Self, BuildReport) {
        let registry = Self::with_default_name(config.default_pipeline.clone());
        let report = PipelineBuilder::new(resolver)
            .with_mode(config.mode)
            .load(config, &registry);
        (registry, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::CallContext;
    use crate::core::step::{Step, StepRegistry};
    use crate::execution::engine::{Chain, Completion};
    use std::io;
    use std::sync::{Arc, Mutex};

    struct Pass(&'static str);

    impl Step for Pass {
        fn name(&self) -> &str {
            self.0
        }

        fn execute(&self, _ctx: &mut CallContext, chain: Chain<'_>) -> Completion {
            chain.proceed()
        }
    }

    fn resolver() -> StepRegistry {
        StepRegistry::new()
            .with_step("auth", || Pass("auth"))
            .with_step("trace", || Pass("trace"))
            .with_step("loadbalance", || Pass("loadbalance"))
    }

    /// Formatted log output shared between a subscriber and the test
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn capture_logs(f: impl FnOnce()) -> Vec<String> {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        buffer.lines()
    }

    fn lists(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(name, list)| (name.to_string(), list.to_string()))
            .collect()
    }

    #[test]
    fn test_build_preserves_configured_order() {
        let steps = resolver();
        let builder = PipelineBuilder::new(&steps);

        let pipeline = builder
            .build("Consumer", "default", &parse_step_names(" loadbalance ,auth,, trace"))
            .unwrap();

        assert_eq!(pipeline.step_names(), vec!["loadbalance", "auth", "trace"]);
        assert_eq!(pipeline.service_type, "Consumer");
        assert_eq!(pipeline.name, "default");
    }

    #[test]
    fn test_build_unknown_step_fails() {
        let steps = resolver();
        let builder = PipelineBuilder::new(&steps);
        let names = parse_step_names("auth, bogus");

        let err = builder.build("Consumer", "default", &names).unwrap_err();

        match err {
            PipelineError::Build {
                service_type,
                pipeline,
                steps,
                source,
            } => {
                assert_eq!(service_type, "Consumer");
                assert_eq!(pipeline, "default");
                assert_eq!(steps, vec!["auth", "bogus"]);
                assert!(matches!(*source, PipelineError::StepNotFound(ref n) if n == "bogus"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_pipeline_is_registered() {
        let steps = resolver();
        let registry = PipelineRegistry::new();

        let report = registry.create_pipelines("Provider", &lists(&[("default", " , ")]), &steps);

        assert!(report.is_ok());
        let pipeline = registry.lookup("Provider", "").unwrap();
        assert!(pipeline.is_empty());
        assert!(pipeline.call(&mut CallContext::default()).unwrap().is_ok());
    }

    #[test]
    fn test_failed_pipeline_does_not_block_siblings() {
        let steps = resolver();
        let registry = PipelineRegistry::new();

        let report = registry.create_pipelines(
            "Consumer",
            &lists(&[("broken", "auth,missing"), ("default", "auth,trace"), ("fast", "loadbalance")]),
            &steps,
        );

        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.registered,
            vec![RegistryKey::new("Consumer", "default"), RegistryKey::new("Consumer", "fast")]
        );
        assert!(matches!(
            registry.lookup("Consumer", "broken"),
            Err(PipelineError::NotFound(_))
        ));
        assert_eq!(registry.lookup("Consumer", "fast").unwrap().step_names(), vec!["loadbalance"]);
        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_rebuild_overwrites_previous_pipeline() {
        let steps = resolver();
        let registry = PipelineRegistry::new();

        registry.create_pipelines("Consumer", &lists(&[("default", "auth")]), &steps);
        registry.create_pipelines("Consumer", &lists(&[("default", "trace, loadbalance")]), &steps);

        assert_eq!(
            registry.lookup("Consumer", "default").unwrap().step_names(),
            vec!["trace", "loadbalance"]
        );
    }

    #[test]
    fn test_registry_from_config() {
        let yaml = r#"
default_pipeline: main
mode: serialized
pipelines:
  Consumer:
    main: "auth, trace"
  Provider:
    main: "trace"
    audit: "auth, ghost"
"#;
        let config = PipelinesConfig::from_yaml(yaml).unwrap();
        let steps = resolver();

        let (registry, report) = PipelineRegistry::from_config(&config, &steps);

        assert_eq!(report.registered.len(), 2);
        assert_eq!(report.errors.len(), 1);
        let consumer = registry.lookup("Consumer", "").unwrap();
        assert_eq!(consumer.step_names(), vec!["auth", "trace"]);
        assert_eq!(consumer.mode(), TraversalMode::Serialized);
        assert_eq!(registry.lookup("Provider", "").unwrap().step_names(), vec!["trace"]);
    }

    #[test]
    fn test_build_logs_step_count() {
        let steps = resolver();

        let logs = capture_logs(|| {
            PipelineBuilder::new(&steps)
                .build("Consumer", "default", &parse_step_names("auth, trace, loadbalance"))
                .unwrap();
        });

        let built = logs
            .iter()
            .find(|line| line.contains("Pipeline built"))
            .expect("no build event");
        assert!(built.contains("DEBUG"), "{built}");
        assert!(built.contains("steps=3"), "{built}");
        assert!(built.contains("Consumer"), "{built}");
        assert!(!logs.iter().any(|line| line.contains("Pipeline is empty")));
    }

    #[test]
    fn test_empty_pipeline_logs_warning() {
        let steps = resolver();

        let logs = capture_logs(|| {
            PipelineBuilder::new(&steps)
                .build("Provider", "default", &parse_step_names(" , "))
                .unwrap();
        });

        let empty = logs
            .iter()
            .find(|line| line.contains("Pipeline is empty"))
            .expect("no empty-pipeline event");
        assert!(empty.contains("WARN"), "{empty}");
        assert!(empty.contains("Provider"), "{empty}");
    }
}
