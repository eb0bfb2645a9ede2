pub mod backend;
pub mod clicks;
#[cfg(all(feature = "native", target_os = "linux"))]
mod icon;
pub mod lifecycle;
pub mod platform;

pub use backend::{BackendEvents, NativeBackend};
pub use clicks::{ClickListener, ClickOutcome};
pub use lifecycle::LoopState;
pub use platform::HeadlessBackend;

use crate::config::TrayConfig;
use crate::menu::{IdAllocator, MenuItem, MenuItemId, MenuItemState, Registry};
use clicks::ClickChannel;
use lifecycle::Lifecycle;
use std::sync::Arc;
use tokio::sync::oneshot;

pub(crate) struct Shared {
    pub(crate) backend: Arc<dyn NativeBackend>,
    pub(crate) ids: IdAllocator,
    pub(crate) registry: Arc<Registry>,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) clicks: ClickChannel,
}

/// One tray session: the menu, its click channel and the native loop.
///
/// Clones share the same session. Everything except [`Systray::run`] may be
/// called from any thread.
#[derive(Clone)]
pub struct Systray {
    shared: Arc<Shared>,
}

impl Systray {
    pub fn new(backend: Arc<dyn NativeBackend>) -> Self {
        Self::with_config(backend, &TrayConfig::default())
    }

    pub fn with_config(backend: Arc<dyn NativeBackend>, config: &TrayConfig) -> Self {
        let registry = Arc::new(Registry::new(Arc::clone(&backend)));
        Self {
            shared: Arc::new(Shared {
                backend,
                ids: IdAllocator::new(),
                registry,
                lifecycle: Lifecycle::new(),
                clicks: ClickChannel::new(config.log_dropped_clicks),
            }),
        }
    }

    /// Runs the native loop on the calling thread, which becomes the UI thread.
    ///
    /// `on_ready` runs on its own thread once the backend reports ready.
    /// Blocks until [`Systray::quit`]. Calling it again is a no-op.
    pub fn run<F>(&self, on_ready: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(ready_rx) = self.shared.lifecycle.begin() else {
            log::warn!("Tray loop already started, ignoring run");
            return;
        };

        spawn_ready_waiter(ready_rx, on_ready);

        log::info!("Starting native tray loop");
        let events = BackendEvents::new(Arc::clone(&self.shared));
        if let Err(e) = self.shared.backend.run_loop(events) {
            log::error!("Native tray loop failed: {:#}", e);
        }

        self.shared.lifecycle.finish();
        log::info!("Native tray loop stopped");
    }

    /// Stops the native loop. Safe to call at any time, any number of times.
    pub fn quit(&self) {
        if self.shared.lifecycle.request_stop() {
            log::info!("Quitting tray");
            self.shared.backend.stop();
        }
    }

    /// Creates an item and publishes it, placed before `insert_before` when given.
    pub fn add_menu_item(
        &self,
        title: impl Into<String>,
        tooltip: impl Into<String>,
        insert_before: Option<&MenuItem>,
    ) -> MenuItem {
        let state = MenuItemState::new(self.shared.ids.next(), title, tooltip);
        log::debug!("Adding menu item {} ({:?})", state.id, state.title);
        MenuItem::create(
            Arc::clone(&self.shared.registry),
            state,
            insert_before.map(MenuItem::id),
        )
    }

    pub fn lookup(&self, id: MenuItemId) -> Option<MenuItemState> {
        self.shared.registry.lookup(id)
    }

    /// Every published item, ordered by id.
    pub fn items(&self) -> Vec<MenuItemState> {
        self.shared.registry.snapshot()
    }

    pub fn clicks(&self) -> ClickListener {
        self.shared.clicks.listener()
    }

    pub fn state(&self) -> LoopState {
        self.shared.lifecycle.state()
    }

    pub fn is_ready(&self) -> bool {
        self.shared.lifecycle.is_ready()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    pub fn is_ui_thread(&self) -> bool {
        self.shared.lifecycle.is_ui_thread()
    }
}

fn spawn_ready_waiter<F>(ready_rx: oneshot::Receiver<()>, on_ready: F)
where
    F: FnOnce() + Send + 'static,
{
    let spawned = std::thread::Builder::new()
        .name("systray-ready".into())
        .spawn(move || match ready_rx.blocking_recv() {
            Ok(()) => on_ready(),
            Err(_) => log::debug!("Tray loop ended before it was ready"),
        });

    if let Err(e) = spawned {
        log::error!("Failed to spawn ready thread: {}", e);
    }
}
