//! # lens-extension-host
//!
//! A minimal extension host.
//!
//! The host is responsible for:
//! - Reading the list of installed extensions from its configuration
//! - Constructing each extension and driving its enable/disable lifecycle
//! - Attaching a heartbeat to every extension while it is enabled
//! - Disabling everything on shutdown
//!
//! ## Configuration
//!
//! The host reads configuration from
//! `$XDG_CONFIG_HOME/lens-extension-host/config.toml`.
//!
//! ## Running
//!
//! ```bash
//! cargo run --bin lens-extension-host
//!
//! # With debug logging
//! RUST_LOG=debug cargo run --bin lens-extension-host
//! ```

use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lens_extension_host::config::Config;
use lens_extension_host::heartbeat;
use lens_extension_host::registry::ExtensionRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration is read before logging is up so its log level applies.
    let (config, config_error) = match Config::load_default() {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.host.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting lens-extension-host v{}", env!("CARGO_PKG_VERSION"));
    match config_error {
        None => info!("Loaded configuration from default path"),
        Some(e) => warn!("Failed to load config, using defaults: {:#}", e),
    }

    let mut registry = ExtensionRegistry::new();
    let mut to_enable = Vec::new();
    for entry in &config.extensions {
        match registry.insert(entry.to_installed()) {
            Ok(id) if entry.enabled => to_enable.push(id),
            Ok(_) => {}
            Err(e) => warn!("Failed to register {}: {}", entry.manifest_path, e),
        }
    }

    let period = Duration::from_secs(config.host.heartbeat_secs);
    let mut heartbeats = Vec::new();
    for id in registry.ids() {
        if let Some(extension) = registry.get(id.as_str()) {
            heartbeats.push(heartbeat::bind(extension, period));
        }
    }

    for id in &to_enable {
        if let Err(e) = registry.enable(id.as_str()).await {
            warn!("Failed to enable {}: {}", id, e);
            // Activation failures leave the extension enabled; roll back here.
            if let Err(e) = registry.disable(id.as_str()).await {
                warn!("Failed to roll back {}: {}", id, e);
            }
        }
    }

    for extension in registry.list() {
        info!(
            "Extension: {}@{} ({}) - bundled: {}",
            extension.name,
            extension.version,
            if extension.enabled { "enabled" } else { "disabled" },
            extension.bundled
        );
    }

    info!("Host startup complete");
    info!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");

    let failures = registry.disable_all().await;
    if failures > 0 {
        warn!("{} extension(s) failed to deactivate", failures);
    }

    for (subscription, _) in heartbeats {
        subscription.cancel();
    }

    info!("Host stopped");
    Ok(())
}
