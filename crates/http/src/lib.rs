//! Composable request-processing pipeline.
//!
//! Capabilities extend an immutable per-request context with new means,
//! handlers delegate through an explicit flow protocol, and a pattern-based
//! route dispatcher supports nested (tail) routing on top of it.
//!
//! ```rust
//! use burrow_http::{
//!     dispatch_by_pattern, handler_fn, http_listener, Capability, Flow, RenderMeans, Rendering,
//!     RouteEntry, Routing,
//! };
//!
//! let listener = http_listener(
//!     Rendering
//!         .and(Routing::new())
//!         .for_handler(dispatch_by_pattern(RouteEntry::new(
//!             "greet/**",
//!             handler_fn(|context| {
//!                 let render = context.require_means::<RenderMeans>()?;
//!                 render.render_json(&serde_json::json!({ "hello": "world" }))?;
//!                 Flow::done()
//!             }),
//!         ))),
//! );
//! # let _ = listener;
//! ```

pub mod capability;
pub mod context;
pub mod dispatcher;
pub mod enums;
pub mod error;
pub mod forwarding;
pub mod handler;
pub mod listener;
pub mod logging;
pub mod middleware;
pub mod render;
pub mod request;
pub mod response;
pub mod router;
mod thread_pool;
pub mod util;

pub use burrow_logger::{LogLevel, LogSink, Logger};

pub use capability::{BoundHandler, Capability, CapabilityChain, IntoCapabilities, Next};
pub use context::{Extension, MeansMap, RequestAddresses, RequestContext};
pub use dispatcher::{invoke, Step};
pub use enums::HttpMethod;
pub use error::{reason_phrase, DispatchError, ErrorRendering, HttpError};
pub use forwarding::{request_url, ForwardTrust, HttpForwarding};
pub use handler::{handler_fn, pipeline, Flow, HandlerSequence, HttpHandler};
pub use listener::{http_listener, HttpListener, ListenerOptions};
pub use logging::Logging;
pub use middleware::{middleware, Middleware};
pub use render::{RenderMeans, Rendering};
pub use request::ServerRequest;
pub use response::ServerResponse;
pub use router::{
    dispatch_by_pattern, DispatchByPattern, PatternParser, RouteEntry, RouteMatch, RoutePattern,
    RouterMeans, Routing, RoutingConfig, UrlRoute,
};
pub use util::add_response_header;
