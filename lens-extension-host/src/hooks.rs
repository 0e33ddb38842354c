//! Activation hooks used by the host for configured extensions.
//!
//! Entry points declared in the manifest (`main`, `renderer`) are resolved
//! against the directory holding the manifest. Activation fails if any of
//! them is missing.

use crate::error::HookError;
use async_trait::async_trait;
use lens_extension_api::{ExtensionHooks, InstalledExtension};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Hooks for an extension loaded from the host configuration.
#[derive(Debug, Clone)]
pub struct HostHooks {
    extension: String,
    entry_points: Vec<PathBuf>,
}

impl HostHooks {
    /// Derive hooks from an installation record.
    pub fn for_installed(installed: &InstalledExtension) -> Self {
        let base_dir = Path::new(&installed.manifest_path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let entry_points = [&installed.manifest.main, &installed.manifest.renderer]
            .into_iter()
            .flatten()
            .map(|entry| base_dir.join(entry))
            .collect();

        Self {
            extension: format!(
                "{}@{}",
                installed.manifest.name, installed.manifest.version
            ),
            entry_points,
        }
    }

    /// Resolved entry point paths.
    pub fn entry_points(&self) -> &[PathBuf] {
        &self.entry_points
    }
}

#[async_trait]
impl ExtensionHooks for HostHooks {
    type Error = HookError;

    async fn on_activate(&self) -> Result<(), HookError> {
        for path in &self.entry_points {
            if tokio::fs::metadata(path).await.is_err() {
                return Err(HookError::MissingEntryPoint {
                    extension: self.extension.clone(),
                    path: path.clone(),
                });
            }
            debug!(extension = %self.extension, "Found entry point {:?}", path);
        }
        Ok(())
    }

    async fn on_deactivate(&self) -> Result<(), HookError> {
        debug!(extension = %self.extension, "Deactivated");
        Ok(())
    }
}
