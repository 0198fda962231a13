//! Pattern-based route dispatch.
//!
//! The [`Routing`] capability seeds route means from the request URL; a
//! [`dispatch_by_pattern`] handler then matches the current route against an
//! ordered entry list and delegates the unmatched tail to the first match's
//! target. Nested dispatchers are ordinary targets: each one sees `route`
//! already narrowed to the tail while `full_route` stays untouched.

mod dispatch;
mod pattern;
mod route;

#[cfg(test)]
mod pattern_test;

pub use dispatch::{dispatch_by_pattern, DispatchByPattern, PatternSpec, RouteEntry};
pub use pattern::{
    CaptureKey, CapturePosition, CaptureValue, MatrixPatternParser, PatternEntry, PatternError,
    PatternParser, RouteCapture, RouteMatch, RoutePattern, UrlPatternParser,
};
pub use route::{RouteSegment, UrlRoute};

use std::sync::Arc;

use crate::capability::Capability;
use crate::context::{Extension, RequestContext};
use crate::error::DispatchError;
use crate::forwarding::{request_url, ForwardTrust};

/// Route means available once [`Routing`] is applied.
#[derive(Clone)]
pub struct RouterMeans {
    /// Original route for the whole pipeline. Never reassigned.
    pub full_route: UrlRoute,
    /// Route currently being matched; a tail under nested dispatch.
    pub route: UrlRoute,
    /// The match that produced the current tail, when there is one.
    pub route_match: Option<RouteMatch>,
    /// Pattern dialect used to compile entry patterns.
    pub pattern_parser: Arc<dyn PatternParser>,
}

type BuildRoute = Arc<dyn Fn(&RequestContext) -> Result<UrlRoute, DispatchError> + Send + Sync>;

/// How [`Routing`] builds the pipeline route.
#[derive(Clone)]
pub struct RoutingConfig {
    /// Pattern dialect; the URL path dialect when unset.
    pub pattern_parser: Option<Arc<dyn PatternParser>>,
    /// Honor forwarding headers when building the route URL.
    pub forward_trust: ForwardTrust,
    /// Custom route construction; overrides the URL-derived default.
    pub build_route: Option<BuildRoute>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            pattern_parser: None,
            forward_trust: ForwardTrust::Never,
            build_route: None,
        }
    }
}

/// Seeds [`RouterMeans`] from the request URL.
pub struct Routing {
    config: RoutingConfig,
}

impl Routing {
    pub fn new() -> Self {
        Self::with(RoutingConfig::default())
    }

    pub fn with(config: RoutingConfig) -> Self {
        Self { config }
    }
}

impl Default for Routing {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for Routing {
    fn modification(&self, context: &RequestContext) -> Result<Extension, DispatchError> {
        let route = match &self.config.build_route {
            Some(build) => build(context)?,
            None => match self.config.forward_trust {
                ForwardTrust::Never => UrlRoute::from_url(&context.addresses().url),
                ref trust => UrlRoute::from_url(&request_url(context.request(), trust)?),
            },
        };
        let pattern_parser = self
            .config
            .pattern_parser
            .clone()
            .unwrap_or_else(|| Arc::new(UrlPatternParser));
        Ok(Extension::new().with_means(RouterMeans {
            full_route: route.clone(),
            route,
            route_match: None,
            pattern_parser,
        }))
    }
}
