//! # lens-extension-api
//!
//! Lifecycle controller for loaded Lens extensions.
//!
//! This crate provides:
//! - Manifest and installation records handed over by the extension manager
//! - An enabled/disabled lifecycle with async activation hooks
//! - `when_enabled` bindings that attach side effects while an extension is
//!   enabled and detach them when it is disabled
//!
//! ## Writing an extension
//!
//! An extension supplies its setup and teardown logic by implementing
//! [`ExtensionHooks`] and wrapping it in an [`Extension`]:
//!
//! ```
//! use lens_extension_api::{
//!     async_trait, Disposer, Extension, ExtensionHooks, ExtensionManifest, InstalledExtension,
//! };
//! use std::convert::Infallible;
//!
//! struct Demo;
//!
//! #[async_trait]
//! impl ExtensionHooks for Demo {
//!     type Error = Infallible;
//!
//!     async fn on_activate(&self) -> Result<(), Infallible> {
//!         Ok(())
//!     }
//!
//!     async fn on_deactivate(&self) -> Result<(), Infallible> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() {
//! let installed = InstalledExtension::new(
//!     ExtensionManifest::new("demo", "1.0.0"),
//!     "/ext/demo/package.json",
//! );
//! let extension = Extension::new(installed, Demo);
//!
//! let subscription = extension.when_enabled(|| {
//!     println!("attached");
//!     let detach: Disposer = Box::new(|| println!("detached"));
//!     vec![detach]
//! });
//!
//! extension.enable().await.unwrap();
//! extension.disable().await.unwrap();
//! subscription.cancel();
//! # }
//! ```

pub mod extension;
pub mod manifest;
pub mod state;
pub mod subscription;

pub use async_trait::async_trait;
pub use extension::{Extension, ExtensionHooks};
pub use manifest::{ExtensionId, ExtensionManifest, InstalledExtension};
pub use state::{EnabledState, Observer, ObserverId};
pub use subscription::{Disposer, Subscription};
