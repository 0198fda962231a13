use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::capability::Capability;
use crate::context::{Extension, RequestAddresses, RequestContext};
use crate::error::DispatchError;
use crate::request::ServerRequest;

/// Policy governing whether proxy forwarding headers are trusted.
#[derive(Clone, Default)]
pub enum ForwardTrust {
    /// Forwarding headers are ignored.
    #[default]
    Never,
    /// Forwarding headers are always honored.
    Always,
    /// Honored only when the predicate accepts the remote address.
    ByRemote(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl ForwardTrust {
    pub fn trusted(trusted: bool) -> Self {
        if trusted {
            ForwardTrust::Always
        } else {
            ForwardTrust::Never
        }
    }

    pub fn grants(&self, remote_ip: &str) -> bool {
        match self {
            ForwardTrust::Never => false,
            ForwardTrust::Always => true,
            ForwardTrust::ByRemote(accepts) => accepts(remote_ip),
        }
    }
}

impl fmt::Debug for ForwardTrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardTrust::Never => f.write_str("ForwardTrust::Never"),
            ForwardTrust::Always => f.write_str("ForwardTrust::Always"),
            ForwardTrust::ByRemote(_) => f.write_str("ForwardTrust::ByRemote"),
        }
    }
}

#[derive(Debug, Default)]
struct ForwardedInfo {
    host: Option<String>,
    proto: Option<String>,
}

/// Extracts `host` and `proto` from the `Forwarded` header, falling back to
/// the `X-Forwarded-*` equivalents. Only the first hop element is considered.
fn parse_forwarded(request: &ServerRequest) -> ForwardedInfo {
    let mut info = ForwardedInfo::default();
    if let Some(raw) = request.header("forwarded") {
        let first_hop = raw.split(',').next().unwrap_or("");
        for pair in first_hop.split(';') {
            let mut parts = pair.splitn(2, '=');
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            if value.is_empty() {
                continue;
            }
            match key.trim().to_ascii_lowercase().as_str() {
                "host" => info.host = Some(value.to_string()),
                "proto" => info.proto = Some(value.to_string()),
                _ => {}
            }
        }
    }
    if info.host.is_none() {
        info.host = request
            .header("x-forwarded-host")
            .and_then(first_list_value);
    }
    if info.proto.is_none() {
        info.proto = request
            .header("x-forwarded-proto")
            .and_then(first_list_value);
    }
    info
}

fn first_list_value(raw: &str) -> Option<String> {
    let value = raw.split(',').next().unwrap_or("").trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut bytes = scheme.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

fn is_valid_authority(authority: &str) -> bool {
    !authority.is_empty()
        && authority
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b'/' | b'\\' | b'#' | b'?' | b'@'))
}

/// Builds the logical request URL, honoring forwarding headers only when
/// `trust` grants it for the request's remote address.
///
/// A malformed forwarded field falls back to the raw connection value for
/// that field alone; a forwarded authority the URL parser rejects falls back
/// to the raw connection URL.
pub fn request_url(request: &ServerRequest, trust: &ForwardTrust) -> Result<Url, DispatchError> {
    let raw_scheme = if request.secure { "https" } else { "http" };
    let raw_authority = request.host();

    let mut scheme = raw_scheme.to_string();
    let mut authority = raw_authority.to_string();
    let mut forwarded = false;

    if trust.grants(&request.remote_ip) {
        let info = parse_forwarded(request);
        if let Some(proto) = info.proto {
            if is_valid_scheme(&proto) {
                scheme = proto;
                forwarded = true;
            }
        }
        if let Some(host) = info.host {
            if is_valid_authority(&host) {
                authority = host;
                forwarded = true;
            }
        }
    }

    let target = if request.target.starts_with('/') {
        request.target.clone()
    } else {
        format!("/{}", request.target)
    };

    match Url::parse(&format!("{}://{}{}", scheme, authority, target)) {
        Ok(url) => Ok(url),
        Err(_) if forwarded => {
            Ok(Url::parse(&format!("{}://{}{}", raw_scheme, raw_authority, target))?)
        }
        Err(error) => Err(error.into()),
    }
}

/// Re-declares request addressing from proxy forwarding headers.
pub struct HttpForwarding {
    trust: ForwardTrust,
}

impl HttpForwarding {
    pub fn with(trust: ForwardTrust) -> Self {
        Self { trust }
    }
}

impl Capability for HttpForwarding {
    fn modification(&self, context: &RequestContext) -> Result<Extension, DispatchError> {
        let url = request_url(context.request(), &self.trust)?;
        Ok(Extension::new().with_addresses(RequestAddresses {
            url,
            ip: context.addresses().ip.clone(),
        }))
    }
}
