use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::time::Duration;

use crate::menu::{MenuItemId, MenuItemState, Registry};

/// What happened to a click reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A waiting listener received the item.
    Delivered,
    /// Nobody was waiting; the click is gone.
    Dropped,
    /// The id is not in the registry.
    Unknown,
}

/// Unbuffered, lossy fan-in of resolved clicks.
///
/// The native loop never waits here: a click goes to a listener that is
/// already blocked in `recv`, or nowhere.
pub struct ClickChannel {
    tx: Sender<MenuItemState>,
    rx: Receiver<MenuItemState>,
    log_dropped: bool,
}

impl ClickChannel {
    pub fn new(log_dropped: bool) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(0);
        Self { tx, rx, log_dropped }
    }

    pub fn dispatch(&self, registry: &Registry, id: MenuItemId) -> ClickOutcome {
        let Some(item) = registry.lookup(id) else {
            log::debug!("Click on unknown menu item {}", id);
            return ClickOutcome::Unknown;
        };

        match self.tx.try_send(item) {
            Ok(()) => ClickOutcome::Delivered,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                if self.log_dropped {
                    log::debug!("No listener waiting, dropped click on menu item {}", id);
                }
                ClickOutcome::Dropped
            }
        }
    }

    pub fn listener(&self) -> ClickListener {
        ClickListener {
            rx: self.rx.clone(),
        }
    }
}

/// Receiving end of the click channel. Clone freely; each click reaches at most one listener.
#[derive(Clone)]
pub struct ClickListener {
    rx: Receiver<MenuItemState>,
}

impl ClickListener {
    /// Blocks until a click is delivered to this listener.
    pub fn recv(&self) -> Option<MenuItemState> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<MenuItemState> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Never succeeds unless a click is being handed over at this instant.
    pub fn try_recv(&self) -> Option<MenuItemState> {
        self.rx.try_recv().ok()
    }
}
