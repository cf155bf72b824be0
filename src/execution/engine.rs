//! Traversal engine - drives a call through a pipeline's steps

use crate::core::{
    context::{CallContext, Response},
    error::PipelineError,
    pipeline::{Pipeline, TraversalMode},
};
use std::sync::{mpsc, Arc, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Single-shot callback that receives the outcome of a call
pub struct Continuation {
    callback: Box<dyn FnOnce(Response) + Send + 'static>,
}

impl Continuation {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(Response) + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Deliver the outcome, consuming the continuation
    pub fn call(self, response: Response) {
        (self.callback)(response)
    }
}

impl std::fmt::Debug for Continuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Continuation")
    }
}

/// Handle a step uses to continue or end the call it is executing
pub struct Chain<'a> {
    pipeline: &'a Pipeline,
    continuation: Continuation,
}

impl<'a> Chain<'a> {
    /// The pipeline being traversed
    ///
    /// A step may drive the rest of the pipeline itself with
    /// `chain.pipeline().next(ctx, ..)`. In [`TraversalMode::Serialized`] the
    /// call already holds the pipeline, so the nested traversal reuses it.
    pub fn pipeline(&self) -> &'a Pipeline {
        self.pipeline
    }

    /// Hand the call on to the next step
    pub fn proceed(self) -> Completion {
        Completion(Flow::Proceed(self.continuation))
    }

    /// Hand the call on, routing its eventual response through `wrap`
    ///
    /// `wrap` receives the response produced further down the pipeline
    /// together with this step's continuation, and must deliver a response
    /// to it exactly once.
    pub fn proceed_with<F>(self, wrap: F) -> Completion
    where
        F: FnOnce(Response, Continuation) + Send + 'static,
    {
        let upstream = self.continuation;
        Completion(Flow::Proceed(Continuation::new(move |response| {
            wrap(response, upstream)
        })))
    }

    /// Finish the call now, skipping every remaining step
    pub fn complete(self, response: Response) -> Completion {
        self.continuation.call(response);
        Completion(Flow::Done)
    }
}

/// Proof that a step either passed the call on or finished it
#[must_use = "a step must return the completion produced by its chain"]
pub struct Completion(Flow);

enum Flow {
    Proceed(Continuation),
    Done,
}

impl Pipeline {
    /// Run the steps from `ctx.step_index` onwards
    ///
    /// Each step runs after the cursor has moved past it. When the cursor
    /// reaches the end the continuation receives a success response; a step
    /// that completes the chain itself ends the traversal early. The
    /// continuation fires exactly once before this returns.
    pub fn next(&self, ctx: &mut CallContext, continuation: Continuation) {
        if self.mode() == TraversalMode::Concurrent || ctx.held_gate == Some(self.gate_id()) {
            self.drive(ctx, continuation);
            return;
        }

        let _guard = self.gate().lock().unwrap_or_else(PoisonError::into_inner);
        let outer = ctx.held_gate.replace(self.gate_id());
        self.drive(ctx, continuation);
        ctx.held_gate = outer;
    }

    fn drive(&self, ctx: &mut CallContext, continuation: Continuation) {
        let mut continuation = continuation;
        loop {
            let index = ctx.step_index;
            let Some(step) = self.steps().get(index) else {
                continuation.call(Response::ok());
                return;
            };
            ctx.step_index += 1;

            trace!(
                call_id = %ctx.id,
                pipeline = %self.name,
                step = step.name(),
                index,
                "Executing step"
            );

            let chain = Chain {
                pipeline: self,
                continuation,
            };
            match step.execute(ctx, chain).0 {
                Flow::Proceed(next) => continuation = next,
                Flow::Done => {
                    debug!(
                        call_id = %ctx.id,
                        pipeline = %self.name,
                        step = step.name(),
                        skipped = self.len().saturating_sub(ctx.step_index),
                        "Step completed the call"
                    );
                    return;
                }
            }
        }
    }

    /// Traverse the pipeline from the context's cursor and return the outcome
    pub fn call(&self, ctx: &mut CallContext) -> Result<Response, PipelineError> {
        let (tx, rx) = mpsc::channel();
        self.next(
            ctx,
            Continuation::new(move |response| {
                let _ = tx.send(response);
            }),
        );
        rx.try_recv()
            .map_err(|_| PipelineError::Aborted("continuation never fired".to_string()))
    }
}

/// Run one call through a shared pipeline without blocking the async runtime
///
/// Steps execute on tokio's blocking pool, so they may block freely.
pub async fn invoke(
    pipeline: Arc<Pipeline>,
    mut ctx: CallContext,
) -> Result<(CallContext, Response), PipelineError> {
    let (tx, rx) = oneshot::channel();

    let ctx = tokio::task::spawn_blocking(move || {
        pipeline.next(
            &mut ctx,
            Continuation::new(move |response| {
                let _ = tx.send(response);
            }),
        );
        ctx
    })
    .await
    .map_err(|e| PipelineError::Aborted(e.to_string()))?;

    let response = rx
        .await
        .map_err(|_| PipelineError::Aborted("continuation dropped without a response".to_string()))?;

    Ok((ctx, response))
}
