use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{MenuItemId, Registry};

/// Full state of one line of the tray menu, as seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemState {
    pub id: MenuItemId,
    pub title: String,
    pub tooltip: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub separator: bool,
    /// Intent to drop the line from the menu. Backends that cannot remove items ignore it.
    #[serde(default)]
    pub remove: bool,
}

impl MenuItemState {
    pub fn new(id: MenuItemId, title: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            tooltip: tooltip.into(),
            disabled: false,
            checked: false,
            separator: false,
            remove: false,
        }
    }
}

/// Handle to a menu item created by [`crate::Systray::add_menu_item`].
///
/// Every mutator republishes the whole item to the registry and the backend.
/// To mutate one item from several threads, share it behind a `Mutex`.
pub struct MenuItem {
    state: MenuItemState,
    registry: Arc<Registry>,
}

impl MenuItem {
    pub(crate) fn create(
        registry: Arc<Registry>,
        state: MenuItemState,
        insert_before: Option<MenuItemId>,
    ) -> Self {
        let item = Self { state, registry };
        item.update(insert_before);
        item
    }

    pub fn id(&self) -> MenuItemId {
        self.state.id
    }

    pub fn title(&self) -> &str {
        &self.state.title
    }

    pub fn tooltip(&self) -> &str {
        &self.state.tooltip
    }

    pub fn disabled(&self) -> bool {
        self.state.disabled
    }

    pub fn checked(&self) -> bool {
        self.state.checked
    }

    pub fn separator(&self) -> bool {
        self.state.separator
    }

    pub fn is_removed(&self) -> bool {
        self.state.remove
    }

    pub fn state(&self) -> &MenuItemState {
        &self.state
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.state.title = title.into();
        self.update(None);
    }

    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) {
        self.state.tooltip = tooltip.into();
        self.update(None);
    }

    pub fn set_separator(&mut self, separator: bool) {
        self.state.separator = separator;
        self.update(None);
    }

    pub fn enable(&mut self) {
        self.state.disabled = false;
        self.update(None);
    }

    pub fn disable(&mut self) {
        self.state.disabled = true;
        self.update(None);
    }

    pub fn check(&mut self) {
        self.state.checked = true;
        self.update(None);
    }

    pub fn uncheck(&mut self) {
        self.state.checked = false;
        self.update(None);
    }

    /// Flags the item for removal. Only backends that support removal act on it.
    pub fn remove(&mut self) {
        self.state.remove = true;
        self.update(None);
    }

    fn update(&self, insert_before: Option<MenuItemId>) {
        self.registry.publish(self.state.clone(), insert_before);
    }
}

impl std::fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MenuItem").field(&self.state).finish()
    }
}
