mod headless;

#[cfg(all(feature = "native", target_os = "linux"))]
mod linux;

pub use headless::HeadlessBackend;

#[cfg(all(feature = "native", target_os = "linux"))]
pub use linux::GtkBackend;

use super::NativeBackend;
use crate::config::TrayConfig;
use anyhow::Result;
use std::sync::Arc;

/// Whether this build renders a real tray icon.
pub const HAS_NATIVE_BACKEND: bool = cfg!(all(feature = "native", target_os = "linux"));

#[cfg(all(feature = "native", target_os = "linux"))]
pub fn create_backend(config: &TrayConfig) -> Result<Arc<dyn NativeBackend>> {
    Ok(Arc::new(GtkBackend::new(config)))
}

#[cfg(not(all(feature = "native", target_os = "linux")))]
pub fn create_backend(_config: &TrayConfig) -> Result<Arc<dyn NativeBackend>> {
    log::warn!("No native tray backend in this build, running headless");
    Ok(Arc::new(HeadlessBackend::new()))
}
