//! Extension registry for managing loaded extensions.
//!
//! The registry owns every extension the host has loaded, keyed by
//! [`ExtensionId`], and routes enable/disable requests to them.

use crate::error::{HostError, HostResult};
use crate::hooks::HostHooks;
use lens_extension_api::{Extension, ExtensionId, InstalledExtension};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Extension as stored by the host.
pub type HostExtension = Extension<HostHooks>;

/// Registry of loaded extensions.
#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: BTreeMap<ExtensionId, Arc<HostExtension>>,
}

impl ExtensionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an installed extension. It starts disabled.
    pub fn insert(&mut self, installed: InstalledExtension) -> HostResult<ExtensionId> {
        let hooks = HostHooks::for_installed(&installed);
        let extension = Extension::new(installed, hooks);
        let id = extension.id().clone();

        if self.extensions.contains_key(&id) {
            return Err(HostError::AlreadyLoaded(id.to_string()));
        }

        info!(
            "Registered extension: {}@{}{}",
            extension.name(),
            extension.version(),
            if extension.is_bundled() { " (bundled)" } else { "" }
        );

        self.extensions.insert(id.clone(), Arc::new(extension));
        Ok(id)
    }

    /// Disable and remove an extension.
    pub async fn remove(&mut self, id: &str) -> HostResult<Arc<HostExtension>> {
        let extension = self.lookup(id)?;
        extension.disable().await?;
        self.extensions.remove(id);
        info!("Unloaded extension: {}", id);
        Ok(extension)
    }

    /// Enable an extension.
    pub async fn enable(&self, id: &str) -> HostResult<()> {
        self.lookup(id)?.enable().await?;
        Ok(())
    }

    /// Disable an extension.
    pub async fn disable(&self, id: &str) -> HostResult<()> {
        self.lookup(id)?.disable().await?;
        Ok(())
    }

    /// Enable, disable or flip an extension.
    pub async fn toggle(&self, id: &str, target: Option<bool>) -> HostResult<()> {
        self.lookup(id)?.toggle(target).await?;
        Ok(())
    }

    /// Disable every extension, continuing past hook failures.
    ///
    /// Returns the number of extensions whose deactivation hook failed.
    pub async fn disable_all(&self) -> usize {
        let mut failures = 0;
        for (id, extension) in &self.extensions {
            if let Err(e) = extension.disable().await {
                warn!("Failed to disable extension {}: {}", id, e);
                failures += 1;
            }
        }
        failures
    }

    /// Check if an extension is enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.extensions
            .get(id)
            .map(|extension| extension.is_enabled())
            .unwrap_or(false)
    }

    /// Get an extension by id.
    pub fn get(&self, id: &str) -> Option<&Arc<HostExtension>> {
        self.extensions.get(id)
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<ExtensionId> {
        self.extensions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// List extension information.
    pub fn list(&self) -> Vec<ExtensionInfo> {
        self.extensions
            .values()
            .map(|extension| ExtensionInfo {
                id: extension.id().clone(),
                name: extension.name().to_string(),
                version: extension.version().to_string(),
                description: extension.description().map(str::to_string),
                bundled: extension.is_bundled(),
                enabled: extension.is_enabled(),
            })
            .collect()
    }

    fn lookup(&self, id: &str) -> HostResult<Arc<HostExtension>> {
        self.extensions
            .get(id)
            .cloned()
            .ok_or_else(|| HostError::ExtensionNotFound(id.to_string()))
    }
}

/// Information about a loaded extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionInfo {
    pub id: ExtensionId,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub bundled: bool,
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_extension_api::ExtensionManifest;

    fn installed(name: &str) -> InstalledExtension {
        InstalledExtension::new(
            ExtensionManifest::new(name, "0.1.0"),
            format!("/ext/{name}/package.json"),
        )
    }

    #[test]
    fn test_registry_insert() {
        let mut registry = ExtensionRegistry::new();
        let id = registry.insert(installed("demo")).unwrap();

        assert_eq!(id.as_str(), "/ext/demo/package.json");
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_enabled("/ext/demo/package.json"));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = ExtensionRegistry::new();
        registry.insert(installed("demo")).unwrap();

        let err = registry.insert(installed("demo")).unwrap_err();
        assert!(matches!(err, HostError::AlreadyLoaded(_)));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_registry_enable_disable() {
        let mut registry = ExtensionRegistry::new();
        let id = registry.insert(installed("demo")).unwrap();

        registry.enable(id.as_str()).await.unwrap();
        assert!(registry.is_enabled(id.as_str()));

        registry.disable(id.as_str()).await.unwrap();
        assert!(!registry.is_enabled(id.as_str()));

        registry.toggle(id.as_str(), None).await.unwrap();
        assert!(registry.is_enabled(id.as_str()));
    }

    #[tokio::test]
    async fn test_registry_unknown_id() {
        let registry = ExtensionRegistry::new();

        let err = registry.enable("/ext/missing/package.json").await.unwrap_err();
        assert!(matches!(err, HostError::ExtensionNotFound(_)));
        assert!(!registry.is_enabled("/ext/missing/package.json"));
    }

    #[tokio::test]
    async fn test_registry_remove_disables() {
        let mut registry = ExtensionRegistry::new();
        let id = registry.insert(installed("demo")).unwrap();
        registry.enable(id.as_str()).await.unwrap();

        let removed = registry.remove(id.as_str()).await.unwrap();
        assert!(!removed.is_enabled());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_list_sorted_by_id() {
        let mut registry = ExtensionRegistry::new();
        registry.insert(installed("zeta")).unwrap();
        registry.insert(installed("alpha")).unwrap();

        let names: Vec<_> = registry.list().into_iter().map(|info| info.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
