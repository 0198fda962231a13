use std::sync::Arc;

use crate::context::{Extension, RequestContext};
use crate::error::DispatchError;
use crate::handler::{Flow, HttpHandler};

/// Result of driving one handler to quiescence.
pub enum Step {
    /// A participant finalized the response.
    Responded,
    /// Control fell through; an extension, when present, applies to the next
    /// sibling participant.
    Fall(Option<Extension>),
}

/// Drives a handler through the delegation protocol.
///
/// Delegations iterate here instead of recursing, so dynamic nesting depth
/// (router delegating to router delegating to router) never deepens the call
/// stack. All work for one request runs on the calling thread; no two
/// participants of the same request ever run concurrently.
pub fn invoke(
    handler: Arc<dyn HttpHandler>,
    context: RequestContext,
) -> Result<Step, DispatchError> {
    let mut handler = handler;
    let mut context = context;
    loop {
        match handler.handle(&context)? {
            Flow::Done => return Ok(Step::Responded),
            Flow::Continue(extension) => return Ok(Step::Fall(extension)),
            Flow::Delegate(next, extension) => {
                tracing::event!(tracing::Level::TRACE, stage = "delegate");
                if let Some(extension) = extension {
                    context = context.extend(extension);
                }
                handler = next;
            }
        }
    }
}
