//! Thread-safe bridge between worker threads and a native tray menu.
//!
//! Any thread may create and mutate menu items. A single UI thread runs the
//! native loop through [`Systray::run`]; clicks come back on a shared,
//! best-effort [`ClickListener`].

pub mod config;
pub mod menu;
pub mod paths;
pub mod tray;

pub use config::{ItemConfig, TrayConfig};
pub use menu::{MenuItem, MenuItemId, MenuItemState};
pub use tray::{
    BackendEvents, ClickListener, ClickOutcome, HeadlessBackend, LoopState, NativeBackend, Systray,
};
