use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::enums::HttpMethod;

/// Raw request handle supplied by the transport collaborator.
///
/// Header names are stored lowercased. The target keeps the path and query
/// exactly as received on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRequest {
    pub method: HttpMethod,
    /// Request target as received: `/path?query`.
    pub target: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Remote peer address.
    pub remote_ip: String,
    /// Authority the connection was accepted on (`host` or `host:port`).
    pub local_authority: String,
    /// Whether the transport connection is encrypted.
    #[serde(default)]
    pub secure: bool,
}

impl ServerRequest {
    pub fn new(method: HttpMethod, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HashMap::new(),
            body: None,
            remote_ip: "127.0.0.1".to_string(),
            local_authority: "localhost".to_string(),
            secure: false,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_remote_ip(mut self, ip: impl Into<String>) -> Self {
        self.remote_ip = ip.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The authority the request addressed: the Host header when present,
    /// the accepting authority otherwise.
    pub fn host(&self) -> &str {
        self.header("host").unwrap_or(&self.local_authority)
    }
}
