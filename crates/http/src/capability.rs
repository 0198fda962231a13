use std::sync::Arc;

use crate::context::{Extension, RequestContext};
use crate::dispatcher::{invoke, Step};
use crate::error::DispatchError;
use crate::handler::{Flow, HttpHandler};

/// Continuation handed to [`Capability::wrap`]; runs the rest of the
/// composition.
pub struct Next<'a> {
    proceed: &'a dyn Fn(RequestContext) -> Result<Step, DispatchError>,
}

impl Next<'_> {
    pub fn proceed(&self, context: RequestContext) -> Result<Step, DispatchError> {
        (self.proceed)(context)
    }
}

/// A unit that extends the request context and may enclose downstream
/// execution.
///
/// Composition is associative and order-preserving: in `a.and(b)`, `b`'s
/// modification is evaluated against the context already extended by `a`, and
/// `a`'s [`Capability::wrap`] encloses `b`'s. No capability observes context
/// state from after a later capability ran.
pub trait Capability: Send + Sync + 'static {
    /// Means this capability provides to downstream participants.
    fn modification(&self, context: &RequestContext) -> Result<Extension, DispatchError>;

    /// Encloses downstream execution. `context` already carries this
    /// capability's modification. The default proceeds untouched; overriding
    /// lets a capability observe or intercept downstream failures.
    fn wrap(&self, context: &RequestContext, next: Next<'_>) -> Result<Step, DispatchError> {
        next.proceed(context.clone())
    }

    /// Chains `other` after this capability.
    fn and(self, other: impl IntoCapabilities) -> CapabilityChain
    where
        Self: Sized,
    {
        let mut capabilities: Vec<Arc<dyn Capability>> = vec![Arc::new(self)];
        capabilities.extend(other.into_capabilities());
        CapabilityChain { capabilities }
    }

    /// Binds a terminal handler, producing the composed pipeline handler.
    fn for_handler(self, handler: impl HttpHandler + 'static) -> BoundHandler
    where
        Self: Sized,
    {
        CapabilityChain {
            capabilities: vec![Arc::new(self)],
        }
        .for_handler(handler)
    }
}

/// Conversion into an ordered capability list; lets `and` splice chains flat
/// so grouping never changes behavior.
pub trait IntoCapabilities {
    fn into_capabilities(self) -> Vec<Arc<dyn Capability>>;
}

impl<C: Capability> IntoCapabilities for C {
    fn into_capabilities(self) -> Vec<Arc<dyn Capability>> {
        vec![Arc::new(self)]
    }
}

impl IntoCapabilities for CapabilityChain {
    fn into_capabilities(self) -> Vec<Arc<dyn Capability>> {
        self.capabilities
    }
}

/// Ordered capability composition.
pub struct CapabilityChain {
    capabilities: Vec<Arc<dyn Capability>>,
}

impl CapabilityChain {
    pub fn and(mut self, other: impl IntoCapabilities) -> CapabilityChain {
        self.capabilities.extend(other.into_capabilities());
        self
    }

    pub fn for_handler(self, handler: impl HttpHandler + 'static) -> BoundHandler {
        BoundHandler {
            capabilities: self.capabilities,
            terminal: Arc::new(handler),
        }
    }
}

/// A capability composition bound to its terminal handler.
pub struct BoundHandler {
    capabilities: Vec<Arc<dyn Capability>>,
    terminal: Arc<dyn HttpHandler>,
}

impl BoundHandler {
    fn run_from(&self, index: usize, context: RequestContext) -> Result<Step, DispatchError> {
        let Some(capability) = self.capabilities.get(index) else {
            return invoke(self.terminal.clone(), context);
        };
        let modification = capability.modification(&context)?;
        let context = context.extend(modification);
        let proceed = |next_context: RequestContext| self.run_from(index + 1, next_context);
        capability.wrap(&context, Next { proceed: &proceed })
    }
}

impl HttpHandler for BoundHandler {
    fn handle(&self, context: &RequestContext) -> Result<Flow, DispatchError> {
        match self.run_from(0, context.clone())? {
            Step::Responded => Ok(Flow::Done),
            Step::Fall(extension) => Ok(Flow::Continue(extension)),
        }
    }
}
