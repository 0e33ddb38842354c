//! Observable enabled/disabled flag.
//!
//! [`EnabledState`] is the single piece of mutable state an extension owns.
//! Writes go through [`EnabledState::set`], which notifies observers only when
//! the value actually changes. Observers are plain callbacks run in
//! registration order; async consumers can use [`EnabledState::watch`]
//! instead.
//!
//! Transitions are serialized: a flip, its watch publication and its
//! observer dispatch complete before the next transition starts, even when
//! `set` is called from several threads. The transition lock is re-entrant
//! on the thread holding it, so observers may still flip the cell or cancel
//! bindings.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use tokio::sync::watch;

/// Callback invoked with the new value after every transition.
pub type Observer = Arc<dyn Fn(bool) + Send + Sync>;

/// Handle identifying one registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Re-entrant lock ordering transitions against binding and cancellation.
#[derive(Default)]
struct TransitionLock {
    owner: Mutex<Option<ThreadId>>,
    free: Condvar,
}

impl TransitionLock {
    fn acquire(&self) -> TransitionGuard<'_> {
        let me = thread::current().id();
        let mut owner = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
        if *owner == Some(me) {
            return TransitionGuard {
                lock: self,
                owned: false,
            };
        }
        while owner.is_some() {
            owner = self.free.wait(owner).unwrap_or_else(PoisonError::into_inner);
        }
        *owner = Some(me);
        TransitionGuard {
            lock: self,
            owned: true,
        }
    }
}

/// Held while a transition, a bind or a cancel is in progress.
pub(crate) struct TransitionGuard<'a> {
    lock: &'a TransitionLock,
    owned: bool,
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        if self.owned {
            *self
                .lock
                .owner
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = None;
            self.lock.free.notify_one();
        }
    }
}

struct Inner {
    enabled: bool,
    next_id: u64,
    observers: Vec<(ObserverId, Observer)>,
}

/// A boolean state cell with an explicit observer list.
pub struct EnabledState {
    inner: Mutex<Inner>,
    transitions: TransitionLock,
    tx: watch::Sender<bool>,
}

impl EnabledState {
    /// Create a cell in the disabled state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Mutex::new(Inner {
                enabled: false,
                next_id: 0,
                observers: Vec::new(),
            }),
            transitions: TransitionLock::default(),
            tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until no other thread is mid-transition.
    pub(crate) fn transition(&self) -> TransitionGuard<'_> {
        self.transitions.acquire()
    }

    /// Current value.
    pub fn get(&self) -> bool {
        self.lock().enabled
    }

    /// Write `value`, returning `true` if it differed from the previous one.
    ///
    /// Observers run after the value lock is released, so they may read the
    /// cell or register further observers. Observers added by a callback
    /// during this notification are not invoked for the current transition.
    /// A concurrent `set` from another thread waits until dispatch finishes.
    pub fn set(&self, value: bool) -> bool {
        let _transition = self.transition();
        let observers: Vec<Observer> = {
            let mut inner = self.lock();
            if inner.enabled == value {
                return false;
            }
            inner.enabled = value;
            inner.observers.iter().map(|(_, f)| Arc::clone(f)).collect()
        };

        self.tx.send_replace(value);

        for observer in observers {
            observer(value);
        }

        true
    }

    /// Register an observer, returning its id and the value at registration.
    pub fn observe(&self, observer: Observer) -> (ObserverId, bool) {
        let mut inner = self.lock();
        let id = ObserverId(inner.next_id);
        inner.next_id += 1;
        inner.observers.push((id, observer));
        (id, inner.enabled)
    }

    /// Remove an observer. Returns `false` if it was already removed.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        let mut inner = self.lock();
        let before = inner.observers.len();
        inner.observers.retain(|(observer_id, _)| *observer_id != id);
        inner.observers.len() != before
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    /// Subscribe to transitions over a watch channel.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for EnabledState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnabledState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("EnabledState")
            .field("enabled", &inner.enabled)
            .field("observers", &inner.observers.len())
            .finish()
    }
}
