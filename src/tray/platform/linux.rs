use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use gtk::glib;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tray_icon::menu::{CheckMenuItem, IsMenuItem, Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::TrayIconBuilder;

use crate::config::TrayConfig;
use crate::menu::{MenuItemId, MenuItemState};
use crate::tray::backend::{BackendEvents, NativeBackend};
use crate::tray::icon;

enum UiCommand {
    Apply {
        item: MenuItemState,
        insert_before: Option<MenuItemId>,
    },
    Quit,
}

/// GTK tray. Menu changes are queued and applied by the GTK main loop, which
/// polls the queue and the click receiver every `poll_interval`.
///
/// The queue closes when the loop ends; later applies fail.
pub struct GtkBackend {
    commands: Sender<UiCommand>,
    inbox: Mutex<Option<Receiver<UiCommand>>>,
    tooltip: String,
    title: Option<String>,
    poll_interval: Duration,
}

impl GtkBackend {
    pub fn new(config: &TrayConfig) -> Self {
        let (commands, inbox) = crossbeam_channel::unbounded();
        Self {
            commands,
            inbox: Mutex::new(Some(inbox)),
            tooltip: config.tooltip.clone(),
            title: config.title.clone(),
            poll_interval: config.poll_interval(),
        }
    }

    /// Hands the queue's only receiver to the loop. It is dropped with the
    /// loop, which closes the queue.
    fn take_inbox(&self) -> Result<Receiver<UiCommand>> {
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .context("Tray UI loop already ran")
    }
}

impl NativeBackend for GtkBackend {
    fn run_loop(&self, events: BackendEvents) -> Result<()> {
        let inbox = self.take_inbox()?;

        gtk::init().context("Failed to initialize GTK")?;

        let menu = Menu::new();
        let mut builder = TrayIconBuilder::new()
            .with_menu(Box::new(menu.clone()))
            .with_tooltip(&self.tooltip)
            .with_icon(icon::create_icon()?);
        if let Some(title) = &self.title {
            builder = builder.with_title(title);
        }
        let _tray_icon = builder.build().context("Failed to create tray icon")?;

        let mut native = NativeMenu::new(menu);
        let menu_events = MenuEvent::receiver();
        let click_events = events.clone();

        glib::timeout_add_local(self.poll_interval, move || {
            while let Ok(command) = inbox.try_recv() {
                match command {
                    UiCommand::Apply { item, insert_before } => native.apply(&item, insert_before),
                    UiCommand::Quit => {
                        gtk::main_quit();
                        return glib::ControlFlow::Break;
                    }
                }
            }

            while let Ok(event) = menu_events.try_recv() {
                match event.id.0.parse::<MenuItemId>() {
                    Ok(id) => {
                        click_events.item_clicked(id);
                        native.restore(id);
                    }
                    Err(_) => log::debug!("Ignoring foreign menu event: {}", event.id.0),
                }
            }
            glib::ControlFlow::Continue
        });

        events.ready();
        gtk::main();
        Ok(())
    }

    fn stop(&self) {
        let _ = self.commands.send(UiCommand::Quit);
    }

    fn apply_menu_item(
        &self,
        item: &MenuItemState,
        insert_before: Option<MenuItemId>,
    ) -> Result<()> {
        self.commands
            .send(UiCommand::Apply {
                item: item.clone(),
                insert_before,
            })
            .map_err(|_| anyhow::anyhow!("Tray UI queue is closed"))
    }
}

enum NativeEntry {
    Plain(MenuItem),
    Check(CheckMenuItem),
    Separator(PredefinedMenuItem),
}

impl NativeEntry {
    fn build(item: &MenuItemState) -> Self {
        let id = item.id.to_string();
        if item.separator {
            NativeEntry::Separator(PredefinedMenuItem::separator())
        } else if item.checked {
            let enabled = !item.disabled;
            NativeEntry::Check(CheckMenuItem::with_id(id, &item.title, enabled, true, None))
        } else {
            NativeEntry::Plain(MenuItem::with_id(id, &item.title, !item.disabled, None))
        }
    }

    fn fits(&self, item: &MenuItemState) -> bool {
        match self {
            NativeEntry::Separator(_) => item.separator,
            NativeEntry::Check(_) => !item.separator && item.checked,
            NativeEntry::Plain(_) => !item.separator && !item.checked,
        }
    }

    fn update(&self, item: &MenuItemState) {
        match self {
            NativeEntry::Plain(entry) => {
                entry.set_text(&item.title);
                entry.set_enabled(!item.disabled);
            }
            NativeEntry::Check(entry) => {
                entry.set_text(&item.title);
                entry.set_enabled(!item.disabled);
                entry.set_checked(item.checked);
            }
            NativeEntry::Separator(_) => {}
        }
    }

    fn as_item(&self) -> &dyn IsMenuItem {
        match self {
            NativeEntry::Plain(entry) => entry,
            NativeEntry::Check(entry) => entry,
            NativeEntry::Separator(entry) => entry,
        }
    }
}

/// Menu state owned by the GTK thread. `order` mirrors the native positions,
/// `applied` holds the last state published for every placed entry.
struct NativeMenu {
    menu: Menu,
    order: Vec<MenuItemId>,
    entries: HashMap<MenuItemId, NativeEntry>,
    applied: HashMap<MenuItemId, MenuItemState>,
}

impl NativeMenu {
    fn new(menu: Menu) -> Self {
        Self {
            menu,
            order: Vec::new(),
            entries: HashMap::new(),
            applied: HashMap::new(),
        }
    }

    /// Puts an entry back to its published state. GTK toggles check items on
    /// click by itself; only an apply may change what the menu shows.
    fn restore(&self, id: MenuItemId) {
        if let (Some(entry), Some(state)) = (self.entries.get(&id), self.applied.get(&id)) {
            entry.update(state);
        }
    }

    fn apply(&mut self, item: &MenuItemState, insert_before: Option<MenuItemId>) {
        if item.remove {
            self.applied.remove(&item.id);
        } else {
            self.applied.insert(item.id, item.clone());
        }

        let placed = self.order.iter().position(|id| *id == item.id);

        match placed {
            Some(index) if item.remove => {
                self.order.remove(index);
                if let Some(entry) = self.entries.remove(&item.id) {
                    if let Err(e) = self.menu.remove(entry.as_item()) {
                        log::warn!("Failed to remove menu item {}: {}", item.id, e);
                    }
                }
            }
            Some(index) => match self.entries.get(&item.id) {
                Some(entry) if entry.fits(item) => entry.update(item),
                _ => self.replace(index, item),
            },
            None if item.remove => {}
            None => {
                let index = insert_before
                    .and_then(|before| self.order.iter().position(|id| *id == before))
                    .unwrap_or(self.order.len());
                if self.insert(index, item) {
                    self.order.insert(index, item.id);
                }
            }
        }
    }

    fn replace(&mut self, index: usize, item: &MenuItemState) {
        if let Some(old) = self.entries.remove(&item.id) {
            if let Err(e) = self.menu.remove(old.as_item()) {
                log::warn!("Failed to replace menu item {}: {}", item.id, e);
            }
        }
        if !self.insert(index, item) {
            self.order.remove(index);
        }
    }

    fn insert(&mut self, index: usize, item: &MenuItemState) -> bool {
        let entry = NativeEntry::build(item);
        if let Err(e) = self.menu.insert(entry.as_item(), index) {
            log::warn!("Failed to insert menu item {}: {}", item.id, e);
            return false;
        }
        self.entries.insert(item.id, entry);
        true
    }
}
