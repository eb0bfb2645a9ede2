use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::menu::{MenuItemId, MenuItemState};
use crate::tray::backend::{BackendEvents, NativeBackend};
use crate::tray::clicks::ClickOutcome;

enum LoopCommand {
    Click {
        id: MenuItemId,
        reply: Sender<ClickOutcome>,
    },
    Quit,
}

#[derive(Default)]
struct HeadlessMenu {
    order: Vec<MenuItemId>,
    items: HashMap<MenuItemId, MenuItemState>,
    applies: usize,
}

impl HeadlessMenu {
    fn apply(&mut self, item: &MenuItemState, insert_before: Option<MenuItemId>) {
        self.applies += 1;
        let placed = self.order.iter().position(|id| *id == item.id);

        match (placed, item.remove) {
            (Some(index), true) => {
                self.order.remove(index);
            }
            (None, false) if !self.items.contains_key(&item.id) => {
                let index = insert_before
                    .and_then(|before| self.order.iter().position(|id| *id == before))
                    .unwrap_or(self.order.len());
                self.order.insert(index, item.id);
            }
            _ => {}
        }

        self.items.insert(item.id, item.clone());
    }
}

/// Backend without any UI. The loop drains a command queue until it sees `Quit`.
///
/// Keeps the menu it would have rendered so callers can inspect it, and lets
/// them inject clicks, which are dispatched from the loop thread.
pub struct HeadlessBackend {
    menu: Mutex<HeadlessMenu>,
    commands: Sender<LoopCommand>,
    inbox: Receiver<LoopCommand>,
    running: Mutex<bool>,
    last_click_thread: Mutex<Option<ThreadId>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        let (commands, inbox) = crossbeam_channel::unbounded();
        Self {
            menu: Mutex::new(HeadlessMenu::default()),
            commands,
            inbox,
            running: Mutex::new(false),
            last_click_thread: Mutex::new(None),
        }
    }

    /// Visible items, top to bottom.
    pub fn order(&self) -> Vec<MenuItemId> {
        self.menu().order.clone()
    }

    /// Visible items with their last applied state, top to bottom.
    pub fn visible_items(&self) -> Vec<MenuItemState> {
        let menu = self.menu();
        menu.order
            .iter()
            .filter_map(|id| menu.items.get(id).cloned())
            .collect()
    }

    /// Last state applied for `id`, removed or not.
    pub fn item(&self, id: MenuItemId) -> Option<MenuItemState> {
        self.menu().items.get(&id).cloned()
    }

    pub fn apply_count(&self) -> usize {
        self.menu().applies
    }

    /// Thread that dispatched the most recent click.
    pub fn last_click_thread(&self) -> Option<ThreadId> {
        *self.last_click_thread.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a click for the loop thread and waits for its outcome.
    /// Returns `None` when the loop is not running.
    pub fn click(&self, id: MenuItemId) -> Option<ClickOutcome> {
        let (reply, outcome) = crossbeam_channel::bounded(1);
        {
            let running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
            if !*running {
                return None;
            }
            self.commands.send(LoopCommand::Click { id, reply }).ok()?;
        }
        outcome.recv().ok()
    }

    fn menu(&self) -> MutexGuard<'_, HeadlessMenu> {
        self.menu.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_running(&self, value: bool) -> MutexGuard<'_, bool> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        *running = value;
        running
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBackend for HeadlessBackend {
    fn run_loop(&self, events: BackendEvents) -> Result<()> {
        drop(self.set_running(true));
        events.ready();

        while let Ok(command) = self.inbox.recv() {
            match command {
                LoopCommand::Click { id, reply } => {
                    *self.last_click_thread.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(thread::current().id());
                    let _ = reply.send(events.item_clicked(id));
                }
                LoopCommand::Quit => break,
            }
        }

        // Pending clicks are dropped so their callers see `None`.
        let _running = self.set_running(false);
        while self.inbox.try_recv().is_ok() {}
        Ok(())
    }

    fn stop(&self) {
        let _ = self.commands.send(LoopCommand::Quit);
    }

    fn apply_menu_item(
        &self,
        item: &MenuItemState,
        insert_before: Option<MenuItemId>,
    ) -> Result<()> {
        self.menu().apply(item, insert_before);
        Ok(())
    }
}
