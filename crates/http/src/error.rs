use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use crate::capability::{Capability, Next};
use crate::context::{Extension, RequestContext};
use crate::dispatcher::Step;
use crate::render::RenderMeans;

/// Standard reason phrase for an HTTP status code.
pub fn reason_phrase(status_code: u16) -> &'static str {
    match status_code {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => "Unknown",
    }
}

/// An error corresponding to an HTTP status code.
///
/// Handlers raise this to short-circuit ordinary dispatch; an error-rendering
/// capability upstream turns it into a status-coded response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpError {
    status_code: u16,
    status_message: Option<String>,
}

impl HttpError {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            status_message: None,
        }
    }

    pub fn with_message(status_code: u16, status_message: impl Into<String>) -> Self {
        Self {
            status_code,
            status_message: Some(status_message.into()),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// The carried message, or the standard phrase for the code.
    pub fn status_message(&self) -> &str {
        self.status_message
            .as_deref()
            .unwrap_or_else(|| reason_phrase(self.status_code))
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code, self.status_message())
    }
}

impl StdError for HttpError {}

/// A failure raised while dispatching a request.
#[derive(Debug)]
pub enum DispatchError {
    /// A deliberate status error.
    Status(HttpError),
    /// Any other failure; presented to clients as an internal error with no
    /// detail.
    Unexpected(Box<dyn StdError + Send + Sync>),
}

impl DispatchError {
    pub fn unexpected(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        DispatchError::Unexpected(error.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::Status(error) => error.status_code(),
            DispatchError::Unexpected(_) => 500,
        }
    }

    /// The status error presented to the client. Unexpected detail stays on
    /// the server side.
    pub fn to_http(&self) -> HttpError {
        match self {
            DispatchError::Status(error) => error.clone(),
            DispatchError::Unexpected(_) => HttpError::new(500),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Status(error) => error.fmt(f),
            DispatchError::Unexpected(error) => write!(f, "internal error: {}", error),
        }
    }
}

impl StdError for DispatchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DispatchError::Status(error) => Some(error),
            DispatchError::Unexpected(error) => Some(error.as_ref()),
        }
    }
}

impl From<HttpError> for DispatchError {
    fn from(error: HttpError) -> Self {
        DispatchError::Status(error)
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(error: serde_json::Error) -> Self {
        DispatchError::unexpected(error)
    }
}

impl From<url::ParseError> for DispatchError {
    fn from(error: url::ParseError) -> Self {
        DispatchError::unexpected(error)
    }
}

/// Renders pipeline failures as status-coded responses.
///
/// Install early in a composition so failures from later participants unwind
/// into it. Unexpected failures are logged through the context logger and
/// normalized to 500.
pub struct ErrorRendering;

impl Capability for ErrorRendering {
    fn modification(&self, _context: &RequestContext) -> Result<Extension, DispatchError> {
        Ok(Extension::new())
    }

    fn wrap(&self, context: &RequestContext, next: Next<'_>) -> Result<Step, DispatchError> {
        match next.proceed(context.clone()) {
            Err(error) => {
                let status = error.to_http();
                match &error {
                    DispatchError::Unexpected(cause) => {
                        context.log().error(&format!("request failed: {}", cause));
                    }
                    DispatchError::Status(_) => {
                        context.log().debug(&format!("request rejected: {}", status));
                    }
                }
                render_error_page(context, &status);
                Ok(Step::Responded)
            }
            outcome => outcome,
        }
    }
}

fn render_error_page(context: &RequestContext, error: &HttpError) {
    let response = context.response();
    response.set_status(error.status_code());
    response.set_status_message(error.status_message());

    let render = RenderMeans::new(response.clone(), context.request().method.is_head());
    render.render_html(format!(
        "<!DOCTYPE html>\n<html><head><title>{error}</title></head><body><h1>{error}</h1></body></html>\n"
    ));
}
