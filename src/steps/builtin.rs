//! Built-in step implementations

use crate::core::{CallContext, Response, Step};
use crate::execution::{Chain, Completion};
use tracing::info;

/// Metadata key [`TagStep`] writes the call ID under
pub const CALL_ID_HEADER: &str = "x-call-id";

/// Passes every call straight on
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStep;

impl NoopStep {
    pub const NAME: &'static str = "noop";
}

impl Step for NoopStep {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&self, _ctx: &mut CallContext, chain: Chain<'_>) -> Completion {
        chain.proceed()
    }
}

/// Logs the call at info level, then passes it on
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStep;

impl LogStep {
    pub const NAME: &'static str = "log";
}

impl Step for LogStep {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&self, ctx: &mut CallContext, chain: Chain<'_>) -> Completion {
        info!(
            call_id = %ctx.id,
            service_type = %chain.pipeline().service_type,
            pipeline = %chain.pipeline().name,
            service = %ctx.service_name,
            operation = %ctx.operation_id,
            "Invocation passing through pipeline"
        );
        chain.proceed()
    }
}

/// Stamps the call ID into the call's metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct TagStep;

impl TagStep {
    pub const NAME: &'static str = "tag";
}

impl Step for TagStep {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&self, ctx: &mut CallContext, chain: Chain<'_>) -> Completion {
        let id = ctx.id.to_string();
        ctx.metadata.entry(CALL_ID_HEADER.to_string()).or_insert(id);
        chain.proceed()
    }
}

/// Ends every call with an error
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectStep;

impl RejectStep {
    pub const NAME: &'static str = "reject";
}

impl Step for RejectStep {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&self, ctx: &mut CallContext, chain: Chain<'_>) -> Completion {
        let err = anyhow::anyhow!(
            "call {}.{} rejected by pipeline {}",
            ctx.service_name,
            ctx.operation_id,
            chain.pipeline().name
        );
        chain.complete(Response::error(err).with_status(403))
    }
}

/// Ends every call by answering with its own arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoStep;

impl EchoStep {
    pub const NAME: &'static str = "echo";
}

impl Step for EchoStep {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&self, ctx: &mut CallContext, chain: Chain<'_>) -> Completion {
        ctx.reply = Some(ctx.args.clone());
        chain.complete(Response::with_result(ctx.args.clone()).with_status(200))
    }
}
