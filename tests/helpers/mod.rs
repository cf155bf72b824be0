//! Test utilities shared by the integration tests

#![allow(dead_code)]

use invoke_chain::core::{CallContext, Response, Step, StepRegistry};
use invoke_chain::execution::{Chain, Completion, Continuation};

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Metadata key tests use to tell calls apart
pub const CALL_TAG: &str = "test-call";

/// Shared, ordered log of `(call tag, step name)` executions
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<(String, String)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: &str, step: &str) {
        self.events.lock().unwrap().push((call.to_string(), step.to_string()));
    }

    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().unwrap().clone()
    }

    /// Step names in execution order, ignoring which call ran them
    pub fn steps(&self) -> Vec<String> {
        self.events().into_iter().map(|(_, step)| step).collect()
    }
}

/// What a [`RecordingStep`] does after recording itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Pass the call on
    Proceed,
    /// Finish the call successfully
    Complete,
    /// Finish the call with an error
    Fail,
}

/// Step that records every execution, optionally sleeping first
pub struct RecordingStep {
    pub name: String,
    pub recorder: Recorder,
    pub behavior: Behavior,
    pub delay: Option<Duration>,
}

impl Step for RecordingStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &mut CallContext, chain: Chain<'_>) -> Completion {
        let call = ctx.get_metadata(CALL_TAG).cloned().unwrap_or_default();
        self.recorder.record(&call, &self.name);

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        match self.behavior {
            Behavior::Proceed => chain.proceed(),
            Behavior::Complete => chain.complete(Response::ok().with_status(200)),
            Behavior::Fail => {
                chain.complete(Response::error(anyhow::anyhow!("{} failed", self.name)).with_status(500))
            }
        }
    }
}

/// Register a recording step for each `(name, behavior)` pair
pub fn recording_registry(
    recorder: &Recorder,
    steps: &[(&str, Behavior)],
    delay: Option<Duration>,
) -> StepRegistry {
    let mut registry = StepRegistry::new();
    for &(name, behavior) in steps {
        let recorder = recorder.clone();
        let step_name = name.to_string();
        registry.register(name, move || RecordingStep {
            name: step_name.clone(),
            recorder: recorder.clone(),
            behavior,
            delay,
        });
    }
    registry
}

/// Context tagged so recorded events can be attributed to it
pub fn tagged_context(tag: &str) -> CallContext {
    let mut ctx = CallContext::new("orders", "create");
    ctx.set_metadata(CALL_TAG, tag);
    ctx
}

/// Continuation that counts its invocations and keeps the last response
pub fn counting_continuation() -> (Continuation, Arc<Mutex<Vec<Response>>>) {
    let responses = Arc::new(Mutex::new(Vec::new()));
    let sink = responses.clone();
    let continuation = Continuation::new(move |response| {
        sink.lock().unwrap().push(response);
    });
    (continuation, responses)
}
