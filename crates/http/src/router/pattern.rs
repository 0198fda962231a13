use std::error::Error as StdError;
use std::fmt;

use crate::error::DispatchError;

use super::route::UrlRoute;

/// A route pattern parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    pattern: String,
    reason: String,
}

impl PatternError {
    fn new(pattern: &str, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid route pattern {:?}: {}", self.pattern, self.reason)
    }
}

impl StdError for PatternError {}

impl From<PatternError> for DispatchError {
    fn from(error: PatternError) -> Self {
        DispatchError::unexpected(error)
    }
}

/// One matcher in a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternEntry {
    /// Matches a segment with this exact name.
    Literal(String),
    /// Matches any one segment without capturing it.
    Wildcard,
    /// Captures one segment under a name.
    Capture(String),
    /// Matches the remaining segments, optionally capturing the run.
    Dirs { capture: Option<String> },
    /// Matches a segment by name and requires the listed matrix attributes.
    Matrix { name: String, attrs: Vec<String> },
}

/// A compiled route pattern.
///
/// The default dialect understands `literal`, `{name}`, `*`, `**` and
/// `{name:**}` path parts. Matching consumes the whole route; only a trailing
/// `**` absorbs arbitrary depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    entries: Vec<PatternEntry>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<RoutePattern, PatternError> {
        let trimmed = pattern.trim_start_matches('/');
        let mut entries = Vec::new();
        if trimmed.is_empty() {
            return Ok(RoutePattern { entries });
        }
        for part in trimmed.split('/') {
            if part.is_empty() {
                return Err(PatternError::new(pattern, "empty path part"));
            }
            entries.push(parse_part(pattern, part)?);
        }
        Self::from_entries_checked(pattern, entries)
    }

    /// Builds a pattern from pre-compiled entries, enforcing that `**` only
    /// appears last.
    pub fn from_entries(entries: Vec<PatternEntry>) -> Result<RoutePattern, PatternError> {
        Self::from_entries_checked("<entries>", entries)
    }

    fn from_entries_checked(
        pattern: &str,
        entries: Vec<PatternEntry>,
    ) -> Result<RoutePattern, PatternError> {
        let dirs_position = entries
            .iter()
            .position(|entry| matches!(entry, PatternEntry::Dirs { .. }));
        if let Some(position) = dirs_position {
            if position + 1 != entries.len() {
                return Err(PatternError::new(pattern, "`**` must be the last part"));
            }
        }
        Ok(RoutePattern { entries })
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    /// Tests the route, reporting captures in pattern order. Matching is a
    /// pure function of the route and the pattern.
    pub fn find_match(&self, route: &UrlRoute) -> Option<RouteMatch> {
        let mut captures = Vec::new();
        let mut index = 0usize;
        let mut dirs_from = None;
        for entry in &self.entries {
            match entry {
                PatternEntry::Literal(name) => {
                    if route.segment(index)?.name() != name {
                        return None;
                    }
                    index += 1;
                }
                PatternEntry::Wildcard => {
                    route.segment(index)?;
                    index += 1;
                }
                PatternEntry::Capture(name) => {
                    let segment = route.segment(index)?;
                    captures.push(RouteCapture::Named {
                        name: name.clone(),
                        value: segment.name().to_string(),
                        entry_index: index,
                    });
                    index += 1;
                }
                PatternEntry::Dirs { capture } => {
                    // at least one directory
                    if index >= route.len() {
                        return None;
                    }
                    dirs_from = Some(index);
                    captures.push(RouteCapture::Dirs {
                        name: capture.clone(),
                        first_index: index,
                        upto_index: route.len(),
                    });
                    index = route.len();
                }
                PatternEntry::Matrix { name, attrs } => {
                    let segment = route.segment(index)?;
                    if segment.name() != name {
                        return None;
                    }
                    if !attrs.iter().all(|attr| segment.attr(attr).is_some()) {
                        return None;
                    }
                    index += 1;
                }
            }
        }
        if index < route.len() {
            return None;
        }
        Some(RouteMatch {
            route: route.clone(),
            captures,
            end_index: index,
            tail_index: dirs_from.unwrap_or(index),
        })
    }
}

fn parse_part(pattern: &str, part: &str) -> Result<PatternEntry, PatternError> {
    if part == "**" {
        return Ok(PatternEntry::Dirs { capture: None });
    }
    if part == "*" {
        return Ok(PatternEntry::Wildcard);
    }
    if let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
        if let Some(name) = inner.strip_suffix(":**") {
            if name.is_empty() {
                return Err(PatternError::new(pattern, "capture name missing"));
            }
            return Ok(PatternEntry::Dirs {
                capture: Some(name.to_string()),
            });
        }
        if inner.is_empty() || inner.contains(':') {
            return Err(PatternError::new(pattern, "unsupported capture form"));
        }
        return Ok(PatternEntry::Capture(inner.to_string()));
    }
    if part.contains('{') || part.contains('}') {
        return Err(PatternError::new(pattern, "unbalanced capture braces"));
    }
    Ok(PatternEntry::Literal(part.to_string()))
}

/// Key under which a capture is reported: a name or a positional index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKey<'a> {
    Name(&'a str),
    Index(usize),
}

/// Value of a reported capture: matched text or a route index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureValue<'a> {
    Text(&'a str),
    Index(usize),
}

/// One match unit, in pattern order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteCapture {
    /// A named single-segment capture.
    Named {
        name: String,
        value: String,
        entry_index: usize,
    },
    /// A run of directories matched by `**`.
    Dirs {
        name: Option<String>,
        first_index: usize,
        upto_index: usize,
    },
}

impl RouteCapture {
    pub fn kind(&self) -> &'static str {
        match self {
            RouteCapture::Named { .. } => "capture",
            RouteCapture::Dirs { .. } => "dirs",
        }
    }

    pub fn key(&self) -> CaptureKey<'_> {
        match self {
            RouteCapture::Named { name, .. } => CaptureKey::Name(name),
            RouteCapture::Dirs {
                name: Some(name), ..
            } => CaptureKey::Name(name),
            RouteCapture::Dirs { first_index, .. } => CaptureKey::Index(*first_index),
        }
    }

    pub fn value(&self) -> CaptureValue<'_> {
        match self {
            RouteCapture::Named { value, .. } => CaptureValue::Text(value),
            RouteCapture::Dirs { upto_index, .. } => CaptureValue::Index(*upto_index),
        }
    }

    /// Route index where this unit began matching.
    pub fn entry_index(&self) -> usize {
        match self {
            RouteCapture::Named { entry_index, .. } => *entry_index,
            RouteCapture::Dirs { first_index, .. } => *first_index,
        }
    }
}

/// A successful match of a route against a pattern.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    route: UrlRoute,
    captures: Vec<RouteCapture>,
    end_index: usize,
    tail_index: usize,
}

impl RouteMatch {
    /// The route this match was computed against.
    pub fn route(&self) -> &UrlRoute {
        &self.route
    }

    pub fn captures(&self) -> &[RouteCapture] {
        &self.captures
    }

    /// Index just past the last consumed segment.
    pub fn end_index(&self) -> usize {
        self.end_index
    }

    /// Where the unmatched trail begins: the first segment a trailing `**`
    /// absorbed, or [`RouteMatch::end_index`] for exact patterns.
    pub fn tail_index(&self) -> usize {
        self.tail_index
    }

    /// The unmatched trailing section. May be empty; the route dispatcher
    /// substitutes the full matched route in that case.
    pub fn tail(&self) -> UrlRoute {
        self.route.section(self.tail_index)
    }

    /// Reports each unit with its position, in pattern order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&RouteCapture, CapturePosition<'_>),
    {
        for capture in &self.captures {
            f(
                capture,
                CapturePosition {
                    route: &self.route,
                    entry_index: capture.entry_index(),
                },
            );
        }
    }
}

/// Position info accompanying a reported capture.
#[derive(Debug, Clone, Copy)]
pub struct CapturePosition<'a> {
    /// The matched route; `route.section(entry_index)` yields the section
    /// this unit began at.
    pub route: &'a UrlRoute,
    pub entry_index: usize,
}

/// Compiles pattern strings. Travels in the router means so pipelines and
/// nested dispatches can swap dialects without touching the dispatcher.
pub trait PatternParser: Send + Sync {
    fn parse(&self, pattern: &str) -> Result<RoutePattern, PatternError>;
}

/// The default URL path dialect.
pub struct UrlPatternParser;

impl PatternParser for UrlPatternParser {
    fn parse(&self, pattern: &str) -> Result<RoutePattern, PatternError> {
        RoutePattern::parse(pattern)
    }
}

/// Matrix-aware dialect: a part written `name;attr` matches a segment with
/// that name carrying the attribute. Other parts behave as in the default
/// dialect.
pub struct MatrixPatternParser;

impl PatternParser for MatrixPatternParser {
    fn parse(&self, pattern: &str) -> Result<RoutePattern, PatternError> {
        let trimmed = pattern.trim_start_matches('/');
        let mut entries = Vec::new();
        if trimmed.is_empty() {
            return RoutePattern::from_entries(entries);
        }
        for part in trimmed.split('/') {
            if part.is_empty() {
                return Err(PatternError::new(pattern, "empty path part"));
            }
            if part.contains(';') {
                let mut pieces = part.split(';');
                let name = pieces.next().unwrap_or("").to_string();
                if name.is_empty() {
                    return Err(PatternError::new(pattern, "matrix part missing a name"));
                }
                let attrs: Vec<String> = pieces
                    .filter(|attr| !attr.is_empty())
                    .map(str::to_string)
                    .collect();
                entries.push(PatternEntry::Matrix { name, attrs });
            } else {
                entries.push(parse_part(pattern, part)?);
            }
        }
        RoutePattern::from_entries(entries)
    }
}
