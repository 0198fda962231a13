use std::sync::Arc;

use crate::context::{Extension, RequestContext};
use crate::dispatcher::{invoke, Step};
use crate::error::DispatchError;

/// Outcome of one handler invocation.
pub enum Flow {
    /// The response was finalized; dispatch stops.
    Done,
    /// Fall through to the next participant, optionally extending the context
    /// it receives.
    Continue(Option<Extension>),
    /// Re-dispatch to another handler, optionally with an extended context.
    Delegate(Arc<dyn HttpHandler>, Option<Extension>),
}

impl Flow {
    pub fn done() -> Result<Flow, DispatchError> {
        Ok(Flow::Done)
    }

    pub fn next() -> Result<Flow, DispatchError> {
        Ok(Flow::Continue(None))
    }

    pub fn next_with(extension: Extension) -> Result<Flow, DispatchError> {
        Ok(Flow::Continue(Some(extension)))
    }

    pub fn delegate(handler: Arc<dyn HttpHandler>) -> Result<Flow, DispatchError> {
        Ok(Flow::Delegate(handler, None))
    }

    pub fn delegate_with(
        handler: Arc<dyn HttpHandler>,
        extension: Extension,
    ) -> Result<Flow, DispatchError> {
        Ok(Flow::Delegate(handler, Some(extension)))
    }
}

/// A participant in the request pipeline.
///
/// A handler either finalizes the response or signals through the returned
/// [`Flow`] how dispatch should continue. Failures travel as `Err` and unwind
/// to the nearest capability that intercepts them.
pub trait HttpHandler: Send + Sync {
    fn handle(&self, context: &RequestContext) -> Result<Flow, DispatchError>;
}

impl<H: HttpHandler + ?Sized> HttpHandler for Arc<H> {
    fn handle(&self, context: &RequestContext) -> Result<Flow, DispatchError> {
        (**self).handle(context)
    }
}

struct FnHandler<F>(F);

impl<F> HttpHandler for FnHandler<F>
where
    F: Fn(&RequestContext) -> Result<Flow, DispatchError> + Send + Sync,
{
    fn handle(&self, context: &RequestContext) -> Result<Flow, DispatchError> {
        (self.0)(context)
    }
}

/// Wraps a closure as a shareable handler.
pub fn handler_fn<F>(f: F) -> Arc<dyn HttpHandler>
where
    F: Fn(&RequestContext) -> Result<Flow, DispatchError> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// Runs handlers in order until one finalizes the response.
///
/// A participant falling through with an extension hands the extended context
/// to its following sibling.
pub struct HandlerSequence {
    handlers: Vec<Arc<dyn HttpHandler>>,
}

pub fn pipeline<I>(handlers: I) -> HandlerSequence
where
    I: IntoIterator<Item = Arc<dyn HttpHandler>>,
{
    HandlerSequence {
        handlers: handlers.into_iter().collect(),
    }
}

impl HttpHandler for HandlerSequence {
    fn handle(&self, context: &RequestContext) -> Result<Flow, DispatchError> {
        let mut context = context.clone();
        for handler in &self.handlers {
            match invoke(handler.clone(), context.clone())? {
                Step::Responded => return Ok(Flow::Done),
                Step::Fall(Some(extension)) => context = context.extend(extension),
                Step::Fall(None) => {}
            }
        }
        Ok(Flow::Continue(None))
    }
}
