//! Extension manifest and installation records.
//!
//! The extension manager locates and parses each `package.json`, then hands
//! an [`InstalledExtension`] to [`crate::Extension::new`]. Nothing in this
//! module touches the filesystem.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique key of a loaded extension: the path of its manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionId(String);

impl ExtensionId {
    pub fn new(manifest_path: impl Into<String>) -> Self {
        Self(manifest_path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExtensionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ExtensionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExtensionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Static descriptor of an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    /// Package name.
    pub name: String,

    /// Version string (semver).
    pub version: String,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Main-process entry point, relative to the manifest directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Renderer entry point, relative to the manifest directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
}

impl ExtensionManifest {
    /// Create a manifest with only the required fields set.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            main: None,
            renderer: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_main(mut self, main: impl Into<String>) -> Self {
        self.main = Some(main.into());
        self
    }

    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }
}

/// A manifest located on disk by the extension manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledExtension {
    pub manifest: ExtensionManifest,

    /// Path to the manifest file. Doubles as the extension id.
    pub manifest_path: String,

    /// Whether the extension ships with the host application.
    #[serde(default)]
    pub is_bundled: bool,
}

impl InstalledExtension {
    /// A user-installed extension.
    pub fn new(manifest: ExtensionManifest, manifest_path: impl Into<String>) -> Self {
        Self {
            manifest,
            manifest_path: manifest_path.into(),
            is_bundled: false,
        }
    }

    pub fn bundled(mut self, is_bundled: bool) -> Self {
        self.is_bundled = is_bundled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_installed_record() {
        let json = r#"{
            "manifest": {
                "name": "demo",
                "version": "1.0.0",
                "description": "A demo extension",
                "renderer": "dist/renderer.js"
            },
            "manifestPath": "/ext/demo/package.json",
            "isBundled": true
        }"#;

        let installed: InstalledExtension = serde_json::from_str(json).unwrap();
        assert_eq!(installed.manifest.name, "demo");
        assert_eq!(installed.manifest.version, "1.0.0");
        assert_eq!(installed.manifest.description.as_deref(), Some("A demo extension"));
        assert_eq!(installed.manifest.main, None);
        assert_eq!(installed.manifest.renderer.as_deref(), Some("dist/renderer.js"));
        assert_eq!(installed.manifest_path, "/ext/demo/package.json");
        assert!(installed.is_bundled);
    }

    #[test]
    fn test_is_bundled_defaults_to_false() {
        let json = r#"{
            "manifest": { "name": "demo", "version": "1.0.0" },
            "manifestPath": "/ext/demo/package.json"
        }"#;

        let installed: InstalledExtension = serde_json::from_str(json).unwrap();
        assert!(!installed.is_bundled);
    }

    #[test]
    fn test_manifest_requires_name_and_version() {
        let json = r#"{ "name": "demo" }"#;
        assert!(serde_json::from_str::<ExtensionManifest>(json).is_err());
    }

    #[test]
    fn test_extension_id_borrows_as_str() {
        let mut ids = std::collections::HashSet::new();
        ids.insert(ExtensionId::new("/ext/demo/package.json"));

        assert!(ids.contains("/ext/demo/package.json"));
        assert_eq!(
            ExtensionId::from("/ext/demo/package.json").to_string(),
            "/ext/demo/package.json"
        );
    }
}
