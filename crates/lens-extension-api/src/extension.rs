//! Loaded extension and its enable/disable lifecycle.

use crate::manifest::{ExtensionId, ExtensionManifest, InstalledExtension};
use crate::state::EnabledState;
use crate::subscription::{Disposer, Subscription};
use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Setup and teardown logic supplied by a concrete extension.
///
/// Hooks that have nothing to await are written as plain async fns.
#[async_trait]
pub trait ExtensionHooks: Send + Sync {
    /// Error returned by a failing hook. Handed back to the caller unchanged.
    type Error: Display + Debug + Send + Sync + 'static;

    /// Called after the extension flips to enabled.
    async fn on_activate(&self) -> Result<(), Self::Error>;

    /// Called after the extension flips to disabled.
    async fn on_deactivate(&self) -> Result<(), Self::Error>;
}

/// A loaded extension.
///
/// Starts disabled. The enabled flag changes only through [`Extension::enable`]
/// and [`Extension::disable`]; both flip the flag before running the hook, so
/// `when_enabled` bindings react without waiting for the hook to settle.
///
/// A failing hook leaves the flag flipped. Callers that want the extension
/// back in its previous state call the opposite method themselves.
pub struct Extension<H> {
    id: ExtensionId,
    manifest: ExtensionManifest,
    is_bundled: bool,
    state: Arc<EnabledState>,
    hooks: H,
}

impl<H: ExtensionHooks> Extension<H> {
    pub fn new(installed: InstalledExtension, hooks: H) -> Self {
        let InstalledExtension {
            manifest,
            manifest_path,
            is_bundled,
        } = installed;

        Self {
            id: ExtensionId::new(manifest_path),
            manifest,
            is_bundled,
            state: Arc::new(EnabledState::new()),
            hooks,
        }
    }

    /// Enable the extension. No-op if already enabled.
    pub async fn enable(&self) -> Result<(), H::Error> {
        if !self.state.set(true) {
            debug!(extension = %self.id, "already enabled");
            return Ok(());
        }

        self.hooks.on_activate().await?;
        info!("[EXTENSION]: enabled {}@{}", self.name(), self.version());
        Ok(())
    }

    /// Disable the extension. No-op if already disabled.
    pub async fn disable(&self) -> Result<(), H::Error> {
        if !self.state.set(false) {
            debug!(extension = %self.id, "already disabled");
            return Ok(());
        }

        self.hooks.on_deactivate().await?;
        info!("[EXTENSION]: disabled {}@{}", self.name(), self.version());
        Ok(())
    }

    /// Enable or disable to match `target`, or flip the current state when
    /// `target` is `None`.
    pub async fn toggle(&self, target: Option<bool>) -> Result<(), H::Error> {
        let enable = target.unwrap_or(!self.is_enabled());
        if enable {
            self.enable().await
        } else {
            self.disable().await
        }
    }

    /// Bind side effects to the enabled state.
    ///
    /// `producer` runs now if the extension is enabled, and again on every
    /// later enable. The disposers it returns run, in order, on the next
    /// disable or when the subscription is cancelled.
    ///
    /// The producer must not enable or disable this extension.
    pub fn when_enabled<F>(&self, producer: F) -> Subscription
    where
        F: FnMut() -> Vec<Disposer> + Send + 'static,
    {
        Subscription::bind(Arc::clone(&self.state), producer)
    }

    /// Watch the enabled flag from async code.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.state.watch()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.get()
    }

    pub fn id(&self) -> &ExtensionId {
        &self.id
    }

    /// Path to the manifest file the extension was loaded from.
    pub fn manifest_path(&self) -> &str {
        self.id.as_str()
    }

    pub fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    pub fn description(&self) -> Option<&str> {
        self.manifest.description.as_deref()
    }

    /// Whether the extension ships with the host application.
    pub fn is_bundled(&self) -> bool {
        self.is_bundled
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }
}

impl<H> Debug for Extension<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("id", &self.id)
            .field("name", &self.manifest.name)
            .field("version", &self.manifest.version)
            .field("is_bundled", &self.is_bundled)
            .field("enabled", &self.state.get())
            .finish()
    }
}
