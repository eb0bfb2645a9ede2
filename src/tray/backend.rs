use anyhow::Result;
use std::sync::Arc;

use super::clicks::ClickOutcome;
use super::Shared;
use crate::menu::{MenuItemId, MenuItemState};

/// Native side of the tray: owns the UI event loop and renders the menu.
pub trait NativeBackend: Send + Sync {
    /// Runs the UI loop on the calling thread until [`NativeBackend::stop`] takes effect.
    ///
    /// Must call `events.ready()` once the loop is up, and `events.item_clicked`
    /// for every click, both from the UI thread.
    fn run_loop(&self, events: BackendEvents) -> Result<()>;

    /// Asks the loop to return. A stop that arrives before `run_loop` starts
    /// must still end it.
    fn stop(&self);

    /// Applies the full state of one item. `insert_before` is only set on first placement.
    fn apply_menu_item(
        &self,
        item: &MenuItemState,
        insert_before: Option<MenuItemId>,
    ) -> Result<()>;
}

/// Callbacks the backend uses to reach the session from its UI thread.
#[derive(Clone)]
pub struct BackendEvents {
    shared: Arc<Shared>,
}

impl BackendEvents {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn ready(&self) {
        if self.shared.lifecycle.signal_ready() {
            log::info!("Tray is ready");
        }
    }

    pub fn item_clicked(&self, id: MenuItemId) -> ClickOutcome {
        self.shared.clicks.dispatch(&self.shared.registry, id)
    }
}
