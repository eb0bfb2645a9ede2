use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{MenuItemId, MenuItemState};
use crate::tray::backend::NativeBackend;

/// Authoritative store of every published menu item.
///
/// Writers hold the lock across the backend apply so the registry and the
/// native menu never disagree outside a single critical section.
pub struct Registry {
    items: RwLock<HashMap<MenuItemId, MenuItemState>>,
    backend: Arc<dyn NativeBackend>,
}

impl Registry {
    pub fn new(backend: Arc<dyn NativeBackend>) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            backend,
        }
    }

    /// Inserts or overwrites the entry for `item.id` without notifying the backend.
    pub fn register(&self, item: MenuItemState) {
        self.write().insert(item.id, item);
    }

    /// Sends the full state to the backend and records it, under one write lock.
    ///
    /// Backend failures are logged and otherwise ignored; the registry still
    /// reflects what the caller asked for.
    pub fn publish(&self, item: MenuItemState, insert_before: Option<MenuItemId>) {
        let mut items = self.write();
        if let Err(e) = self.backend.apply_menu_item(&item, insert_before) {
            log::warn!("Backend could not apply menu item {}: {:#}", item.id, e);
        }
        items.insert(item.id, item);
    }

    pub fn lookup(&self, id: MenuItemId) -> Option<MenuItemState> {
        self.read().get(&id).cloned()
    }

    /// All entries, ordered by id.
    pub fn snapshot(&self) -> Vec<MenuItemState> {
        let mut items: Vec<_> = self.read().values().cloned().collect();
        items.sort_by_key(|item| item.id);
        items
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<MenuItemId, MenuItemState>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<MenuItemId, MenuItemState>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::IdAllocator;
    use crate::tray::backend::BackendEvents;
    use anyhow::Result;
    use std::sync::Mutex;
    use std::thread;

    #[derive(Default)]
    struct FailingBackend {
        attempts: Mutex<Vec<(MenuItemId, Option<MenuItemId>)>>,
    }

    impl NativeBackend for FailingBackend {
        fn run_loop(&self, _events: BackendEvents) -> Result<()> {
            Ok(())
        }

        fn stop(&self) {}

        fn apply_menu_item(
            &self,
            item: &MenuItemState,
            insert_before: Option<MenuItemId>,
        ) -> Result<()> {
            self.attempts.lock().unwrap().push((item.id, insert_before));
            anyhow::bail!("removal is not supported here")
        }
    }

    fn state(ids: &IdAllocator, title: &str) -> MenuItemState {
        MenuItemState::new(ids.next(), title, "")
    }

    #[test]
    fn register_overwrites_previous_entry() {
        // Arrange
        let registry = Registry::new(Arc::new(FailingBackend::default()));
        let ids = IdAllocator::new();
        let mut item = state(&ids, "Open");
        registry.register(item.clone());

        // Act
        item.title = "Close".into();
        registry.register(item.clone());

        // Assert
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(item.id).unwrap().title, "Close");
    }

    #[test]
    fn lookup_of_unknown_id_is_none() {
        let registry = Registry::new(Arc::new(FailingBackend::default()));
        let ids = IdAllocator::new();

        assert!(registry.is_empty());
        assert!(registry.lookup(ids.next()).is_none());
    }

    #[test]
    fn publish_records_state_even_when_backend_fails() {
        // Arrange
        let backend = Arc::new(FailingBackend::default());
        let registry = Registry::new(backend.clone());
        let ids = IdAllocator::new();
        let anchor = state(&ids, "Anchor");
        let mut item = state(&ids, "Gone");
        item.remove = true;

        // Act
        registry.publish(item.clone(), Some(anchor.id));

        // Assert
        assert_eq!(registry.lookup(item.id), Some(item.clone()));
        assert_eq!(*backend.attempts.lock().unwrap(), vec![(item.id, Some(anchor.id))]);
    }

    #[test]
    fn snapshot_is_ordered_by_id() {
        let registry = Registry::new(Arc::new(FailingBackend::default()));
        let ids = IdAllocator::new();
        let items: Vec<_> = ["a", "b", "c", "d"].iter().map(|t| state(&ids, t)).collect();

        for item in items.iter().rev() {
            registry.register(item.clone());
        }

        assert_eq!(registry.snapshot(), items);
    }

    #[test]
    fn concurrent_writers_leave_one_entry_per_id() {
        let registry = Arc::new(Registry::new(Arc::new(FailingBackend::default())));
        let ids = Arc::new(IdAllocator::new());

        let writers: Vec<_> = (0..8)
            .map(|n| {
                let registry = Arc::clone(&registry);
                let ids = Arc::clone(&ids);
                thread::spawn(move || {
                    let mut item = MenuItemState::new(ids.next(), "worker", "");
                    for round in 0..50 {
                        item.title = format!("worker {} round {}", n, round);
                        registry.register(item.clone());
                    }
                    item
                })
            })
            .collect();

        for writer in writers {
            let last = writer.join().unwrap();
            assert_eq!(registry.lookup(last.id), Some(last));
        }
        assert_eq!(registry.len(), 8);
    }
}
