use crate::capability::{Capability, Next};
use crate::context::{Extension, RequestContext};
use crate::dispatcher::Step;
use crate::error::DispatchError;
use crate::request::ServerRequest;
use crate::response::ServerResponse;

/// Adapts a connect-style function into a capability.
///
/// The ware runs before downstream participants. It may finalize the response
/// (dispatch stops), fail (the failure unwinds like any other), or return
/// without responding (control proceeds).
pub fn middleware<F>(ware: F) -> Middleware<F>
where
    F: Fn(&ServerRequest, &ServerResponse) -> Result<(), DispatchError> + Send + Sync + 'static,
{
    Middleware { ware }
}

pub struct Middleware<F> {
    ware: F,
}

impl<F> Capability for Middleware<F>
where
    F: Fn(&ServerRequest, &ServerResponse) -> Result<(), DispatchError> + Send + Sync + 'static,
{
    fn modification(&self, _context: &RequestContext) -> Result<Extension, DispatchError> {
        Ok(Extension::new())
    }

    fn wrap(&self, context: &RequestContext, next: Next<'_>) -> Result<Step, DispatchError> {
        (self.ware)(context.request(), context.response())?;
        if context.response().is_finished() {
            return Ok(Step::Responded);
        }
        next.proceed(context.clone())
    }
}
