use std::sync::Arc;

use burrow_logger::Logger;

use crate::capability::Capability;
use crate::context::{RequestAddresses, RequestContext};
use crate::dispatcher::{invoke, Step};
use crate::error::{DispatchError, ErrorRendering, HttpError};
use crate::forwarding::{request_url, ForwardTrust};
use crate::handler::{handler_fn, pipeline, HttpHandler};
use crate::request::ServerRequest;
use crate::response::ServerResponse;
use crate::thread_pool;

/// Listener behavior knobs.
#[derive(Clone)]
pub struct ListenerOptions {
    /// Logger seeded into each request context.
    pub logger: Logger,
    /// Render failures as status responses at the outermost level.
    pub render_errors: bool,
    /// Answer 404 when no handler finalizes a response.
    pub default_not_found: bool,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self {
            logger: Logger::tracing(),
            render_errors: true,
            default_not_found: true,
        }
    }
}

/// Entry point handed raw request/response pairs by the transport
/// collaborator.
///
/// By default the application handler is wrapped so that unhandled requests
/// answer 404 and failures render as status responses. With those layers
/// disabled, a failure escaping the pipeline is logged, the response handle
/// is aborted, and the error is returned so the transport can reset the
/// connection.
#[derive(Clone)]
pub struct HttpListener {
    handler: Arc<dyn HttpHandler>,
    options: ListenerOptions,
}

pub fn http_listener(handler: impl HttpHandler + 'static) -> HttpListener {
    HttpListener::new(handler)
}

impl HttpListener {
    pub fn new(handler: impl HttpHandler + 'static) -> Self {
        Self::with_options(ListenerOptions::default(), handler)
    }

    pub fn with_options(options: ListenerOptions, handler: impl HttpHandler + 'static) -> Self {
        let mut composed: Arc<dyn HttpHandler> = Arc::new(handler);
        if options.default_not_found {
            let not_found = handler_fn(|_context| Err(HttpError::new(404).into()));
            composed = Arc::new(pipeline([composed, not_found]));
        }
        if options.render_errors {
            composed = Arc::new(ErrorRendering.for_handler(composed));
        }
        Self {
            handler: composed,
            options,
        }
    }

    /// Runs one request to completion on the calling thread.
    pub fn handle(
        &self,
        request: ServerRequest,
        response: ServerResponse,
    ) -> Result<(), DispatchError> {
        let context = match self.seed_context(request, response.clone()) {
            Ok(context) => context,
            Err(error) => {
                // Unparsable request target; no pipeline to run.
                self.options
                    .logger
                    .warn(&format!("rejecting malformed request: {}", error));
                let status = HttpError::new(400);
                response.set_status(status.status_code());
                response.set_status_message(status.status_message());
                response.end(status.to_string().into_bytes());
                return Ok(());
            }
        };
        match invoke(self.handler.clone(), context) {
            Ok(Step::Responded) => Ok(()),
            Ok(Step::Fall(_)) => {
                self.options.logger.warn("no handler finalized a response");
                response.abort();
                Err(HttpError::new(404).into())
            }
            Err(error) => {
                self.options
                    .logger
                    .error(&format!("unhandled request failure: {}", error));
                response.abort();
                Err(error)
            }
        }
    }

    /// Queues the request on the worker pool. Requests run concurrently with
    /// each other; all work for one request stays on a single worker.
    pub fn handle_detached(
        &self,
        request: ServerRequest,
        response: ServerResponse,
    ) -> Result<(), DispatchError> {
        let listener = self.clone();
        thread_pool::submit(Box::new(move || {
            let _ = listener.handle(request, response);
        }))
        .map_err(|_| DispatchError::unexpected("request queue is full"))
    }

    fn seed_context(
        &self,
        request: ServerRequest,
        response: ServerResponse,
    ) -> Result<RequestContext, DispatchError> {
        let url = request_url(&request, &ForwardTrust::Never)?;
        let ip = request.remote_ip.clone();
        Ok(RequestContext::new(
            request,
            response,
            RequestAddresses { url, ip },
            self.options.logger.clone(),
        ))
    }
}
