//! Call context - per-call state and the response delivered to the caller

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Per-call record threaded through every step of a pipeline
///
/// Holds the traversal cursor plus the request data steps inspect and
/// mutate. Exactly one context exists per in-flight call; it is owned by
/// whoever started the traversal and lent to each step in turn.
#[derive(Debug, Clone, Serialize)]
pub struct CallContext {
    /// Unique call ID
    pub id: Uuid,

    /// Index of the next step to run
    pub step_index: usize,

    /// Target microservice name
    pub service_name: String,

    /// Operation (method) being invoked on the target
    pub operation_id: String,

    /// Resolved endpoint, filled in by a load-balancing step
    pub endpoint: Option<String>,

    /// Transport protocol tag
    pub protocol: Option<String>,

    /// Free-form string metadata (headers, trace IDs, ...)
    pub metadata: HashMap<String, String>,

    /// Request arguments
    pub args: Value,

    /// Reply slot a terminal step may fill
    pub reply: Option<Value>,

    /// When the call was created
    pub started_at: DateTime<Utc>,

    /// Gate of the serialized pipeline this call is traversing, if any
    #[serde(skip)]
    pub(crate) held_gate: Option<Uuid>,
}

impl CallContext {
    /// Create a fresh context for a call to `service_name`
    pub fn new(service_name: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            step_index: 0,
            service_name: service_name.into(),
            operation_id: operation_id.into(),
            endpoint: None,
            protocol: None,
            metadata: HashMap::new(),
            args: Value::Null,
            reply: None,
            started_at: Utc::now(),
            held_gate: None,
        }
    }

    /// Attach request arguments
    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    /// Set the transport protocol tag
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set a metadata entry
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Get a metadata entry
    pub fn get_metadata(&self, key: &str) -> Option<&String> {
        self.metadata.get(key)
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

/// Outcome delivered through a call's continuation
#[derive(Debug, Default)]
pub struct Response {
    /// Protocol-level status code (0 when unset)
    pub status: u16,

    /// Result payload, if any
    pub result: Option<Value>,

    /// Failure reported by a step; never inspected by the engine
    pub err: Option<anyhow::Error>,
}

impl Response {
    /// Success with no payload
    pub fn ok() -> Self {
        Self::default()
    }

    /// Success carrying a result
    pub fn with_result(result: Value) -> Self {
        Self {
            result: Some(result),
            ..Self::default()
        }
    }

    /// Failure carrying a step-defined error
    pub fn error(err: impl Into<anyhow::Error>) -> Self {
        Self {
            err: Some(err.into()),
            ..Self::default()
        }
    }

    /// Set the status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Check whether the call succeeded
    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }
}
