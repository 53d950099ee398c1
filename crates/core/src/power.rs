//! Power collaborator.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

/// A pending power request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    /// Start a fresh session.
    Reboot,
    /// End the host loop.
    Shutdown,
}

/// Privileged machine control.
pub trait Power {
    /// Request a restart.
    fn reboot(&mut self);
    /// Request power off.
    fn shutdown(&mut self);
}

/// Records the latest request for the host loop to act on between steps.
///
/// Clones share the same slot, so the host keeps one handle and hands
/// another to the session.
#[derive(Debug, Clone, Default)]
pub struct PowerLatch {
    slot: Arc<Mutex<Option<PowerAction>>>,
}

impl PowerLatch {
    /// Latch with nothing requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending request, if any, without clearing it.
    pub fn requested(&self) -> Option<PowerAction> {
        *self.slot.lock()
    }

    /// Pending request, clearing it.
    pub fn take(&self) -> Option<PowerAction> {
        self.slot.lock().take()
    }

    // A pending shutdown is never downgraded to a reboot.
    fn set(&self, action: PowerAction) {
        let mut slot = self.slot.lock();
        if *slot == Some(PowerAction::Shutdown) {
            return;
        }
        info!(?action, "power request");
        *slot = Some(action);
    }
}

impl Power for PowerLatch {
    fn reboot(&mut self) {
        self.set(PowerAction::Reboot);
    }

    fn shutdown(&mut self) {
        self.set(PowerAction::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_requests() {
        let host = PowerLatch::new();
        let mut session = host.clone();
        assert_eq!(host.requested(), None);

        session.reboot();
        assert_eq!(host.requested(), Some(PowerAction::Reboot));
        session.shutdown();
        assert_eq!(host.take(), Some(PowerAction::Shutdown));
        assert_eq!(session.requested(), None);
    }

    #[test]
    fn reboot_does_not_replace_pending_shutdown() {
        let host = PowerLatch::new();
        let mut session = host.clone();
        session.shutdown();
        session.reboot();
        assert_eq!(host.take(), Some(PowerAction::Shutdown));
        session.reboot();
        assert_eq!(host.take(), Some(PowerAction::Reboot));
    }
}
