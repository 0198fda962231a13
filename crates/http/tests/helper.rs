//! Common test helpers shared across test files.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use burrow_http::{
    HttpListener, HttpMethod, ListenerOptions, LogLevel, LogSink, Logger, ServerRequest,
    ServerResponse,
};

/// A GET request for the given target.
pub fn get(target: &str) -> ServerRequest {
    ServerRequest::new(HttpMethod::Get, target)
}

/// Runs one request through the listener and returns the response handle.
pub fn run(listener: &HttpListener, request: ServerRequest) -> ServerResponse {
    let response = ServerResponse::new();
    let _ = listener.handle(request, response.clone());
    response
}

/// Listener options with a suppressed logger, for failure-path tests.
pub fn quiet_options() -> ListenerOptions {
    ListenerOptions {
        logger: Logger::suppressed(),
        ..Default::default()
    }
}

pub fn json_body(response: &ServerResponse) -> serde_json::Value {
    serde_json::from_slice(&response.body()).expect("response body is not JSON")
}

/// A sink that records every line, for asserting on log output.
pub struct CollectingSink(pub Mutex<Vec<(LogLevel, String)>>);

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(Vec::new())))
    }

    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.0.lock().unwrap().clone()
    }
}

impl LogSink for CollectingSink {
    fn log(&self, level: LogLevel, message: &str) {
        self.0.lock().unwrap().push((level, message.to_string()));
    }
}
