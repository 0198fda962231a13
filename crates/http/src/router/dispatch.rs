use std::sync::Arc;

use crate::context::{Extension, RequestContext};
use crate::error::DispatchError;
use crate::handler::{Flow, HttpHandler};

use super::pattern::{RouteMatch, RoutePattern};
use super::route::UrlRoute;
use super::RouterMeans;

/// Pattern source for a route entry: text compiled through the context's
/// dialect, or a pre-compiled pattern.
#[derive(Clone)]
pub enum PatternSpec {
    Text(String),
    Compiled(RoutePattern),
}

impl From<&str> for PatternSpec {
    fn from(pattern: &str) -> Self {
        PatternSpec::Text(pattern.to_string())
    }
}

impl From<String> for PatternSpec {
    fn from(pattern: String) -> Self {
        PatternSpec::Text(pattern)
    }
}

impl From<RoutePattern> for PatternSpec {
    fn from(pattern: RoutePattern) -> Self {
        PatternSpec::Compiled(pattern)
    }
}

type TailFn = Arc<dyn Fn(&RouteMatch) -> Option<UrlRoute> + Send + Sync>;

/// One (pattern, target) dispatch entry.
#[derive(Clone)]
pub struct RouteEntry {
    on: PatternSpec,
    to: Arc<dyn HttpHandler>,
    tail: Option<TailFn>,
}

impl RouteEntry {
    pub fn new(on: impl Into<PatternSpec>, to: impl HttpHandler + 'static) -> Self {
        Self {
            on: on.into(),
            to: Arc::new(to),
            tail: None,
        }
    }

    /// Overrides the default tail computation for this entry.
    pub fn with_tail<F>(mut self, tail: F) -> Self
    where
        F: Fn(&RouteMatch) -> Option<UrlRoute> + Send + Sync + 'static,
    {
        self.tail = Some(Arc::new(tail));
        self
    }
}

impl From<RouteEntry> for Vec<RouteEntry> {
    fn from(entry: RouteEntry) -> Self {
        vec![entry]
    }
}

/// Dispatches to the first entry whose pattern matches the current route.
///
/// Entries are tried in declaration order and matching short-circuits. When
/// nothing matches, control falls through to whatever follows the dispatcher
/// in composition.
pub struct DispatchByPattern {
    entries: Vec<RouteEntry>,
}

pub fn dispatch_by_pattern(entries: impl Into<Vec<RouteEntry>>) -> DispatchByPattern {
    DispatchByPattern {
        entries: entries.into(),
    }
}

impl HttpHandler for DispatchByPattern {
    fn handle(&self, context: &RequestContext) -> Result<Flow, DispatchError> {
        let means = context.require_means::<RouterMeans>()?;
        for entry in &self.entries {
            let pattern = match &entry.on {
                PatternSpec::Compiled(pattern) => pattern.clone(),
                PatternSpec::Text(text) => means.pattern_parser.parse(text)?,
            };
            let Some(found) = pattern.find_match(&means.route) else {
                continue;
            };

            let tail = match &entry.tail {
                Some(tail_fn) => tail_fn(&found),
                None => Some(found.tail()),
            };
            // An empty tail would leave downstream handlers nothing to
            // inspect; hand them the full matched route instead.
            let tail = match tail {
                Some(tail) if !tail.is_empty() => tail,
                _ => means.route.clone(),
            };

            let extension = Extension::new().with_means(RouterMeans {
                full_route: means.full_route.clone(),
                route: tail,
                route_match: Some(found),
                pattern_parser: means.pattern_parser.clone(),
            });
            return Ok(Flow::Delegate(entry.to.clone(), Some(extension)));
        }
        Ok(Flow::Continue(None))
    }
}
