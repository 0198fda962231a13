use std::sync::Arc;

use super::pattern::{
    CaptureKey, CaptureValue, MatrixPatternParser, PatternEntry, PatternParser, RouteCapture,
    RoutePattern, UrlPatternParser,
};
use super::route::UrlRoute;

fn route(path: &str) -> UrlRoute {
    UrlRoute::from_path(path)
}

#[test]
fn parses_literals_captures_and_dirs() {
    let pattern = RoutePattern::parse("dir/{name}/*/**").unwrap();
    assert_eq!(
        pattern.entries(),
        &[
            PatternEntry::Literal("dir".to_string()),
            PatternEntry::Capture("name".to_string()),
            PatternEntry::Wildcard,
            PatternEntry::Dirs { capture: None },
        ]
    );
}

#[test]
fn parses_named_dirs_capture() {
    let pattern = RoutePattern::parse("test/{tail:**}").unwrap();
    assert_eq!(
        pattern.entries(),
        &[
            PatternEntry::Literal("test".to_string()),
            PatternEntry::Dirs {
                capture: Some("tail".to_string())
            },
        ]
    );
}

#[test]
fn rejects_inner_dirs_and_malformed_captures() {
    assert!(RoutePattern::parse("**/more").is_err());
    assert!(RoutePattern::parse("a//b").is_err());
    assert!(RoutePattern::parse("{").is_err());
    assert!(RoutePattern::parse("{}").is_err());
    assert!(RoutePattern::parse("{name:\\d+}").is_err());
}

#[test]
fn matches_whole_routes_only() {
    let pattern = RoutePattern::parse("test").unwrap();
    assert!(pattern.find_match(&route("/test")).is_some());
    assert!(pattern.find_match(&route("/test/nested")).is_none());
    assert!(pattern.find_match(&route("/other")).is_none());
}

#[test]
fn dirs_require_at_least_one_segment() {
    let pattern = RoutePattern::parse("test/**").unwrap();
    assert!(pattern.find_match(&route("/test")).is_none());
    assert!(pattern.find_match(&route("/test/nested")).is_some());
}

#[test]
fn reports_captures_in_pattern_order() {
    let pattern = RoutePattern::parse("{dir}/**").unwrap();
    let found = pattern.find_match(&route("/test/nested")).unwrap();

    assert_eq!(
        found.captures(),
        &[
            RouteCapture::Named {
                name: "dir".to_string(),
                value: "test".to_string(),
                entry_index: 0,
            },
            RouteCapture::Dirs {
                name: None,
                first_index: 1,
                upto_index: 2,
            },
        ]
    );
    assert_eq!(found.captures()[0].key(), CaptureKey::Name("dir"));
    assert_eq!(found.captures()[0].value(), CaptureValue::Text("test"));
    assert_eq!(found.captures()[1].key(), CaptureKey::Index(1));
    assert_eq!(found.captures()[1].value(), CaptureValue::Index(2));
}

#[test]
fn tail_starts_where_dirs_began() {
    let pattern = RoutePattern::parse("test/**").unwrap();
    let found = pattern
        .find_match(&route("/test/nested?param=value"))
        .unwrap();
    assert_eq!(found.tail().to_string(), "nested?param=value");
}

#[test]
fn exact_match_tail_is_empty() {
    let pattern = RoutePattern::parse("test/nested").unwrap();
    let found = pattern
        .find_match(&route("/test/nested?param=value"))
        .unwrap();
    assert!(found.tail().is_empty());
    assert_eq!(found.end_index(), 2);
}

#[test]
fn matching_is_idempotent() {
    let parser = UrlPatternParser;
    let pattern = parser.parse("{dir}/**").unwrap();
    let target = route("/test/nested?param=value");

    let first = pattern.find_match(&target).unwrap();
    let second = pattern.find_match(&target).unwrap();

    assert_eq!(first.captures(), second.captures());
    assert_eq!(first.tail().to_string(), second.tail().to_string());
}

#[test]
fn matrix_dialect_requires_attributes() {
    let parser = MatrixPatternParser;
    let pattern = parser.parse("test;attr").unwrap();

    let with_attr = UrlRoute::matrix_from_path("/test;attr=value");
    let without_attr = UrlRoute::matrix_from_path("/test");

    assert!(pattern.find_match(&with_attr).is_some());
    assert!(pattern.find_match(&without_attr).is_none());
}

#[test]
fn matrix_route_exposes_segment_attributes() {
    let matrix = UrlRoute::matrix_from_path("/test;attr=val/nested?param=value");
    assert_eq!(matrix.segment(0).unwrap().name(), "test");
    assert_eq!(matrix.segment(0).unwrap().attr("attr"), Some("val"));
    assert_eq!(matrix.segment(1).unwrap().name(), "nested");
}

#[test]
fn decodes_percent_encoded_segment_names() {
    let decoded = route("/a%20b/c");
    assert_eq!(decoded.segment(0).unwrap().name(), "a b");
    // Stringification keeps the wire form.
    assert_eq!(decoded.to_string(), "a%20b/c");
}

#[test]
fn section_shares_the_query() {
    let full = route("/test/nested?param=value");
    assert_eq!(full.section(1).to_string(), "nested?param=value");
    assert_eq!(full.section(2).to_string(), "?param=value");
    assert_eq!(full.section(9).len(), 0);
}

#[test]
fn pattern_parser_objects_are_swappable() {
    let parsers: Vec<Arc<dyn PatternParser>> =
        vec![Arc::new(UrlPatternParser), Arc::new(MatrixPatternParser)];
    for parser in parsers {
        assert!(parser.parse("plain/route").is_ok());
    }
}
