use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared raw response handle.
///
/// The transport and every pipeline participant hold the same underlying
/// state. A response is finalized exactly once by [`ServerResponse::end`];
/// later writes are logged and ignored, as are writes after the transport
/// signalled that the connection closed.
#[derive(Clone, Default)]
pub struct ServerResponse {
    state: Arc<Mutex<ResponseState>>,
}

#[derive(Debug)]
struct ResponseState {
    status_code: u16,
    status_message: Option<String>,
    headers: HashMap<String, Vec<String>>,
    body: Vec<u8>,
    finished: bool,
    closed: bool,
    aborted: bool,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status_code: 200,
            status_message: None,
            headers: HashMap::new(),
            body: Vec::new(),
            finished: false,
            closed: false,
            aborted: false,
        }
    }
}

impl ServerResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, status_code: u16) {
        let mut state = self.state.lock();
        if !state.finished {
            state.status_code = status_code;
        }
    }

    pub fn set_status_message(&self, status_message: impl Into<String>) {
        let mut state = self.state.lock();
        if !state.finished {
            state.status_message = Some(status_message.into());
        }
    }

    /// Replaces the header with a single value.
    pub fn set_header(&self, name: &str, value: impl Into<String>) {
        let mut state = self.state.lock();
        if !state.finished {
            state
                .headers
                .insert(name.to_ascii_lowercase(), vec![value.into()]);
        }
    }

    /// Replaces the header with the given value list.
    pub fn set_header_values(&self, name: &str, values: Vec<String>) {
        let mut state = self.state.lock();
        if !state.finished {
            state.headers.insert(name.to_ascii_lowercase(), values);
        }
    }

    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.state
            .lock()
            .headers
            .get(&name.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// The header's values joined with `, `, when present.
    pub fn header(&self, name: &str) -> Option<String> {
        let values = self.header_values(name);
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    /// Finalizes the response with the given body.
    pub fn end(&self, body: impl Into<Vec<u8>>) {
        let mut state = self.state.lock();
        if state.closed {
            tracing::event!(
                tracing::Level::DEBUG,
                stage = "response_end",
                reason = "connection_closed"
            );
            return;
        }
        if state.finished {
            tracing::event!(
                tracing::Level::WARN,
                stage = "response_end",
                reason = "already_finished"
            );
            return;
        }
        state.body = body.into();
        state.finished = true;
    }

    /// Signals that the pipeline failed without producing a response; the
    /// transport should reset the connection.
    pub fn abort(&self) {
        let mut state = self.state.lock();
        if !state.finished {
            state.aborted = true;
        }
    }

    /// Called by the transport when the underlying connection closes.
    pub fn mark_closed(&self) {
        self.state.lock().closed = true;
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().finished
    }

    pub fn is_aborted(&self) -> bool {
        self.state.lock().aborted
    }

    pub fn status_code(&self) -> u16 {
        self.state.lock().status_code
    }

    pub fn status_message(&self) -> Option<String> {
        self.state.lock().status_message.clone()
    }

    pub fn body(&self) -> Vec<u8> {
        self.state.lock().body.clone()
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body()).into_owned()
    }
}
