use serde::Serialize;

use crate::capability::Capability;
use crate::context::{Extension, RequestContext};
use crate::error::DispatchError;
use crate::response::ServerResponse;

pub const HTML_MIME: &str = "text/html";
pub const JSON_MIME: &str = "application/json";

/// Response body render means.
#[derive(Clone)]
pub struct RenderMeans {
    response: ServerResponse,
    head: bool,
}

impl RenderMeans {
    pub fn new(response: ServerResponse, head: bool) -> Self {
        Self { response, head }
    }

    /// Writes the body with its length. HEAD requests get headers only.
    pub fn render_body(&self, body: impl Into<Vec<u8>>) {
        let body = body.into();
        self.response
            .set_header("Content-Length", body.len().to_string());
        if self.head {
            self.response.end(Vec::new());
        } else {
            self.response.end(body);
        }
    }

    pub fn render_html(&self, html: impl Into<String>) {
        self.response
            .set_header("Content-Type", format!("{}; charset=utf-8", HTML_MIME));
        self.render_body(html.into().into_bytes());
    }

    pub fn render_json(&self, body: &impl Serialize) -> Result<(), DispatchError> {
        self.response
            .set_header("Content-Type", format!("{}; charset=utf-8", JSON_MIME));
        let encoded = serde_json::to_vec(body)?;
        self.render_body(encoded);
        Ok(())
    }
}

/// Provides [`RenderMeans`] ahead of terminal handlers.
pub struct Rendering;

impl Capability for Rendering {
    fn modification(&self, context: &RequestContext) -> Result<Extension, DispatchError> {
        Ok(Extension::new().with_means(RenderMeans::new(
            context.response().clone(),
            context.request().method.is_head(),
        )))
    }
}
