use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Ready and quit handshakes around the native run loop.
///
/// The loop runs at most once per session. The thread that starts it becomes
/// the UI thread for the rest of the process.
pub struct Lifecycle {
    state: Mutex<LoopState>,
    ready_tx: Mutex<Option<oneshot::Sender<()>>>,
    ready: AtomicBool,
    ui_thread: OnceCell<ThreadId>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoopState::Idle),
            ready_tx: Mutex::new(None),
            ready: AtomicBool::new(false),
            ui_thread: OnceCell::new(),
        }
    }

    /// Moves `Idle -> Running`, pins the current thread as the UI thread and
    /// returns the ready receiver. Returns `None` if the loop already ran.
    pub fn begin(&self) -> Option<oneshot::Receiver<()>> {
        let mut state = self.lock_state();
        if *state != LoopState::Idle {
            return None;
        }
        *state = LoopState::Running;

        let _ = self.ui_thread.set(thread::current().id());
        let (tx, rx) = oneshot::channel();
        *self.ready_tx.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        Some(rx)
    }

    /// Fires the ready signal. Only the first call after `begin` has any effect.
    pub fn signal_ready(&self) -> bool {
        let tx = self.ready_tx.lock().unwrap_or_else(PoisonError::into_inner).take();
        let Some(tx) = tx else {
            log::debug!("Ignoring repeated or late ready signal");
            return false;
        };

        self.ready.store(true, Ordering::Release);
        if tx.send(()).is_err() {
            log::debug!("Ready signal fired but nobody is waiting for it");
        }
        true
    }

    /// Moves `Running -> Stopping`. The caller must stop the backend only when this returns true.
    pub fn request_stop(&self) -> bool {
        let mut state = self.lock_state();
        match *state {
            LoopState::Running => {
                *state = LoopState::Stopping;
                true
            }
            other => {
                log::debug!("Quit ignored, tray loop is {:?}", other);
                false
            }
        }
    }

    pub fn finish(&self) {
        *self.lock_state() = LoopState::Stopped;
        self.ready_tx.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    pub fn state(&self) -> LoopState {
        *self.lock_state()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_ui_thread(&self) -> bool {
        self.ui_thread.get() == Some(&thread::current().id())
    }

    fn lock_state(&self) -> MutexGuard<'_, LoopState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
