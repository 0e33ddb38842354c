//! `when_enabled` bindings.
//!
//! A binding pairs a producer, which attaches side effects and returns one
//! [`Disposer`] per effect, with the enabled flag of an extension. The
//! producer runs on every enable; the collected disposers run on every
//! disable. The [`Subscription`] guard ends the binding.
//!
//! Binding and cancelling take the same transition lock as
//! [`EnabledState::set`], so neither can interleave with a flip running on
//! another thread.

use crate::state::{EnabledState, Observer, ObserverId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Releases one previously registered side effect.
pub type Disposer = Box<dyn FnOnce() + Send>;

type Producer = Box<dyn FnMut() -> Vec<Disposer> + Send>;

struct Binding {
    producer: Mutex<Producer>,
    disposers: Mutex<Vec<Disposer>>,
    active: AtomicBool,
}

impl Binding {
    fn react(&self, enabled: bool) {
        if enabled {
            self.attach();
        } else {
            self.release();
        }
    }

    fn attach(&self) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }
        let produced = {
            let mut producer = self.producer.lock().unwrap_or_else(PoisonError::into_inner);
            (*producer)()
        };
        self.disposers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(produced);

        // The producer itself may have cancelled the binding.
        if !self.active.load(Ordering::Acquire) {
            self.release();
        }
    }

    fn release(&self) {
        let disposers = std::mem::take(
            &mut *self.disposers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for dispose in disposers {
            dispose();
        }
    }

    fn attached(&self) -> usize {
        self.disposers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Guard for a `when_enabled` binding.
///
/// Dropping the guard cancels the binding. Use [`Subscription::detach`] to
/// keep it alive for as long as the extension exists.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    state: Arc<EnabledState>,
    observer: ObserverId,
    binding: Arc<Binding>,
    detached: bool,
}

impl Subscription {
    pub(crate) fn bind<F>(state: Arc<EnabledState>, producer: F) -> Self
    where
        F: FnMut() -> Vec<Disposer> + Send + 'static,
    {
        let binding = Arc::new(Binding {
            producer: Mutex::new(Box::new(producer)),
            disposers: Mutex::new(Vec::new()),
            active: AtomicBool::new(true),
        });

        let reactor = Arc::clone(&binding);
        let observer: Observer = Arc::new(move |enabled: bool| reactor.react(enabled));
        let id = {
            let _transition = state.transition();
            let (id, enabled) = state.observe(observer);
            if enabled {
                binding.attach();
            }
            id
        };

        Self {
            state,
            observer: id,
            binding,
            detached: false,
        }
    }

    /// Run all attached disposers and stop reacting to the enabled flag.
    ///
    /// Safe to call more than once.
    pub fn cancel(&self) {
        let _transition = self.state.transition();
        if self.binding.active.swap(false, Ordering::AcqRel) {
            self.state.unobserve(self.observer);
        }
        self.binding.release();
    }

    /// Whether the binding still reacts to transitions.
    pub fn is_active(&self) -> bool {
        self.binding.active.load(Ordering::Acquire)
    }

    /// Number of disposers currently held.
    pub fn attached(&self) -> usize {
        self.binding.attached()
    }

    /// Keep the binding for the rest of the extension's lifetime.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.detached {
            self.cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("observer", &self.observer)
            .field("active", &self.is_active())
            .field("attached", &self.attached())
            .finish()
    }
}
