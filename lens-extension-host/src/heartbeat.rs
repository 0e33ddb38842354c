//! Periodic heartbeat for enabled extensions.
//!
//! While an extension is enabled a background task emits a heartbeat event
//! every `period`. The task is aborted when the extension is disabled.

use lens_extension_api::{Disposer, Extension, ExtensionHooks, Subscription};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// Running count of heartbeats emitted for one extension.
#[derive(Debug, Clone, Default)]
pub struct Beats(Arc<AtomicU64>);

impl Beats {
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Bind a heartbeat task to `extension`'s enabled state.
///
/// Must be called from within a tokio runtime.
pub fn bind<H: ExtensionHooks>(
    extension: &Extension<H>,
    period: Duration,
) -> (Subscription, Beats) {
    let beats = Beats::default();
    let counter = beats.clone();
    let id = extension.id().to_string();

    let subscription = extension.when_enabled(move || {
        let counter = counter.clone();
        let id = id.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let n = counter.0.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(extension = %id, beat = n, "heartbeat");
            }
        });

        let stop: Disposer = Box::new(move || task.abort());
        vec![stop]
    });

    (subscription, beats)
}
