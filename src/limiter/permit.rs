//! Scoped admission guard.

use std::fmt;

use super::AdmissionController;

/// Proof of an admission that releases its slot exactly once.
///
/// The release happens on [`release`](Self::release) or on drop, whichever
/// comes first, so it also fires when the owning future is cancelled or a
/// handler unwinds.
pub struct AdmissionPermit {
    controller: AdmissionController,
    client_id: String,
    epoch: u64,
    released: bool,
}

impl AdmissionPermit {
    pub(crate) fn new(controller: AdmissionController, client_id: &str, epoch: u64) -> Self {
        Self {
            controller,
            client_id: client_id.to_string(),
            epoch,
            released: false,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Releases the slot now instead of at end of scope.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.controller.release_permit(&self.client_id, self.epoch);
        }
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl fmt::Debug for AdmissionPermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionPermit")
            .field("limiter", &self.controller.name())
            .field("client_id", &self.client_id)
            .field("released", &self.released)
            .finish()
    }
}
