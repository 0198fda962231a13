use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use burrow_logger::Logger;
use url::Url;

use crate::error::DispatchError;
use crate::request::ServerRequest;
use crate::response::ServerResponse;

/// Addressing info for one request.
#[derive(Debug, Clone)]
pub struct RequestAddresses {
    /// Logical request URL.
    pub url: Url,
    /// Remote address.
    pub ip: String,
}

/// Type-keyed set of means values.
#[derive(Clone, Default)]
pub struct MeansMap {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl MeansMap {
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.entries.insert(TypeId::of::<T>(), Arc::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    fn merge(&mut self, other: &MeansMap) {
        for (key, value) in &other.entries {
            self.entries.insert(*key, value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A context extension: new means plus optional overrides of the seeds.
///
/// Inserting a means type that is already present shadows the earlier value
/// for downstream participants only.
#[derive(Clone, Default)]
pub struct Extension {
    addresses: Option<RequestAddresses>,
    log: Option<Logger>,
    means: MeansMap,
}

impl Extension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_means<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.means.insert(value);
        self
    }

    pub fn with_addresses(mut self, addresses: RequestAddresses) -> Self {
        self.addresses = Some(addresses);
        self
    }

    pub fn with_log(mut self, log: Logger) -> Self {
        self.log = Some(log);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_none() && self.log.is_none() && self.means.is_empty()
    }
}

/// Immutable record of the means available to handlers for one request.
///
/// Extending never mutates: [`RequestContext::extend`] returns a new value
/// sharing everything not overridden, so an earlier context stays valid
/// across delegation branches.
#[derive(Clone)]
pub struct RequestContext {
    request: Arc<ServerRequest>,
    response: ServerResponse,
    addresses: RequestAddresses,
    log: Logger,
    means: MeansMap,
}

impl RequestContext {
    pub fn new(
        request: ServerRequest,
        response: ServerResponse,
        addresses: RequestAddresses,
        log: Logger,
    ) -> Self {
        Self {
            request: Arc::new(request),
            response,
            addresses,
            log,
            means: MeansMap::default(),
        }
    }

    pub fn request(&self) -> &ServerRequest {
        &self.request
    }

    pub fn response(&self) -> &ServerResponse {
        &self.response
    }

    pub fn addresses(&self) -> &RequestAddresses {
        &self.addresses
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    pub fn means<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.means.get::<T>()
    }

    /// Means access that fails dispatch when the pipeline was composed
    /// without the providing capability.
    pub fn require_means<T: Any + Send + Sync>(&self) -> Result<&T, DispatchError> {
        self.means.get::<T>().ok_or_else(|| {
            DispatchError::unexpected(format!(
                "means {} not provided by any upstream capability",
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn extend(&self, extension: Extension) -> Self {
        let mut next = self.clone();
        if let Some(addresses) = extension.addresses {
            next.addresses = addresses;
        }
        if let Some(log) = extension.log {
            next.log = log;
        }
        next.means.merge(&extension.means);
        next
    }
}
