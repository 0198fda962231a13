use std::fmt;

use percent_encoding::percent_decode_str;
use url::Url;

/// One path segment: decoded name plus optional matrix-style attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSegment {
    name: String,
    attrs: Vec<(String, String)>,
    raw: String,
}

impl RouteSegment {
    fn plain(raw: &str) -> Self {
        Self {
            name: decode(raw),
            attrs: Vec::new(),
            raw: raw.to_string(),
        }
    }

    /// Splits `name;attr=value;flag` into a name and its attributes.
    fn matrix(raw: &str) -> Self {
        let mut parts = raw.split(';');
        let name = decode(parts.next().unwrap_or(""));
        let attrs = parts
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut kv = part.splitn(2, '=');
                let key = decode(kv.next().unwrap_or(""));
                let value = kv.next().map(decode).unwrap_or_default();
                (key, value)
            })
            .collect();
        Self {
            name,
            attrs,
            raw: raw.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for RouteSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Structured decomposition of a request path, usable for pattern matching
/// and section extraction. Stringifies without a leading slash, keeping the
/// query: `dir/file?param=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRoute {
    segments: Vec<RouteSegment>,
    query: Option<String>,
}

impl UrlRoute {
    pub fn from_url(url: &Url) -> Self {
        Self::build(url.path(), url.query(), RouteSegment::plain)
    }

    /// Like [`UrlRoute::from_url`], splitting matrix attributes off each
    /// segment.
    pub fn matrix_from_url(url: &Url) -> Self {
        Self::build(url.path(), url.query(), RouteSegment::matrix)
    }

    /// Parses a bare `path?query` string; useful for hand-built routes.
    pub fn from_path(path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        Self::build(path, query, RouteSegment::plain)
    }

    /// Matrix-aware variant of [`UrlRoute::from_path`].
    pub fn matrix_from_path(path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        Self::build(path, query, RouteSegment::matrix)
    }

    fn build(path: &str, query: Option<&str>, segment: fn(&str) -> RouteSegment) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|part| !part.is_empty())
                .map(segment)
                .collect(),
            query: query.map(str::to_string),
        }
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&RouteSegment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The suffix starting at `from`, sharing this route's query.
    pub fn section(&self, from: usize) -> UrlRoute {
        UrlRoute {
            segments: self.segments[from.min(self.segments.len())..].to_vec(),
            query: self.query.clone(),
        }
    }
}

impl fmt::Display for UrlRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                f.write_str("/")?;
            }
            segment.fmt(f)?;
        }
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        Ok(())
    }
}
