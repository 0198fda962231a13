use burrow_logger::Logger;

use crate::capability::Capability;
use crate::context::{Extension, RequestContext};
use crate::error::DispatchError;

/// Re-declares the context logger for downstream participants.
pub struct Logging {
    log: Logger,
}

impl Logging {
    pub fn log_by(log: Logger) -> Self {
        Self { log }
    }
}

impl Capability for Logging {
    fn modification(&self, _context: &RequestContext) -> Result<Extension, DispatchError> {
        Ok(Extension::new().with_log(self.log.clone()))
    }
}
