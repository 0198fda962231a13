mod helper;

use std::sync::Arc;

use burrow_http::{request_url, ForwardTrust, HttpMethod, ServerRequest};

use helper::get;

fn forwarded(request: ServerRequest, header: &str) -> ServerRequest {
    request.with_header("forwarded", header)
}

#[test]
fn untrusted_builds_from_the_raw_connection() {
    let request = forwarded(
        get("/test/nested?param=value"),
        "host=test.com:8443;proto=https",
    );

    let url = request_url(&request, &ForwardTrust::Never).unwrap();

    assert_eq!(url.as_str(), "http://localhost/test/nested?param=value");
}

#[test]
fn trusted_honors_the_forwarded_header() {
    let request = forwarded(
        get("/test/nested?param=value"),
        "host=test.com:8443;proto=https",
    );

    let url = request_url(&request, &ForwardTrust::Always).unwrap();

    assert_eq!(url.as_str(), "https://test.com:8443/test/nested?param=value");
}

#[test]
fn trusted_falls_back_to_x_forwarded_headers() {
    let request = get("/test")
        .with_header("x-forwarded-host", "proxy.example")
        .with_header("x-forwarded-proto", "https");

    let url = request_url(&request, &ForwardTrust::Always).unwrap();

    assert_eq!(url.as_str(), "https://proxy.example/test");
}

#[test]
fn the_forwarded_header_wins_over_x_forwarded() {
    let request = forwarded(get("/test"), "host=first.example")
        .with_header("x-forwarded-host", "second.example");

    let url = request_url(&request, &ForwardTrust::Always).unwrap();

    assert_eq!(url.host_str(), Some("first.example"));
}

#[test]
fn only_the_first_hop_is_considered() {
    let request = forwarded(get("/test"), "host=near.example, host=far.example");

    let url = request_url(&request, &ForwardTrust::Always).unwrap();

    assert_eq!(url.host_str(), Some("near.example"));
}

#[test]
fn quoted_forwarded_values_are_unwrapped() {
    let request = forwarded(get("/test"), "host=\"test.com:8443\";proto=https");

    let url = request_url(&request, &ForwardTrust::Always).unwrap();

    assert_eq!(url.as_str(), "https://test.com:8443/test");
}

#[test]
fn a_malformed_field_falls_back_alone() {
    // Empty host is malformed; proto still applies.
    let request = forwarded(get("/test"), "host=;proto=https");
    let url = request_url(&request, &ForwardTrust::Always).unwrap();
    assert_eq!(url.as_str(), "https://localhost/test");

    // Invalid proto is malformed; host still applies.
    let request = forwarded(get("/test"), "host=test.com:8443;proto=9bad");
    let url = request_url(&request, &ForwardTrust::Always).unwrap();
    assert_eq!(url.as_str(), "http://test.com:8443/test");
}

#[test]
fn garbage_in_the_header_never_breaks_the_builder() {
    for header in [";;;", "host", "=;=", "proto=", "host=a b c"] {
        let request = forwarded(get("/test"), header);
        let url = request_url(&request, &ForwardTrust::Always).unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
    }
}

#[test]
fn predicate_trust_checks_the_remote_address() {
    let trust = ForwardTrust::ByRemote(Arc::new(|ip: &str| ip == "10.0.0.1"));

    let from_proxy = forwarded(get("/test"), "host=test.com").with_remote_ip("10.0.0.1");
    let url = request_url(&from_proxy, &trust).unwrap();
    assert_eq!(url.host_str(), Some("test.com"));

    let from_elsewhere = forwarded(get("/test"), "host=test.com").with_remote_ip("203.0.113.9");
    let url = request_url(&from_elsewhere, &trust).unwrap();
    assert_eq!(url.host_str(), Some("localhost"));
}

#[test]
fn secure_connections_default_to_https() {
    let mut request = ServerRequest::new(HttpMethod::Get, "/test");
    request.secure = true;

    let url = request_url(&request, &ForwardTrust::Never).unwrap();

    assert_eq!(url.scheme(), "https");
}

#[test]
fn the_host_header_names_the_raw_authority() {
    let request = get("/test").with_header("host", "api.example:8080");

    let url = request_url(&request, &ForwardTrust::Never).unwrap();

    assert_eq!(url.as_str(), "http://api.example:8080/test");
}
