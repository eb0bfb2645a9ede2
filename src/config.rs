use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TOOLTIP: &str = "QoL Systray";
const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayConfig {
    pub tooltip: String,
    pub title: Option<String>,
    /// How often the native loop drains queued menu changes and clicks.
    pub poll_interval_ms: u64,
    pub log_dropped_clicks: bool,
    pub items: Vec<ItemConfig>,
}

/// One initial menu line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tooltip: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub separator: bool,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            tooltip: DEFAULT_TOOLTIP.to_string(),
            title: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_dropped_clicks: true,
            items: Vec::new(),
        }
    }
}

impl TrayConfig {
    /// Loads the user config, falling back to defaults when there is none.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: TrayConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid tray config in {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
