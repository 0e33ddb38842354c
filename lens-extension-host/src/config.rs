//! Configuration file loading and management
//!
//! This module handles loading and parsing the host configuration from
//! `$XDG_CONFIG_HOME/lens-extension-host/config.toml`. If the configuration
//! file doesn't exist, a default configuration is created with documented
//! comments.

use anyhow::{Context, Result};
use lens_extension_api::{ExtensionManifest, InstalledExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Main host configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Host-specific configuration
    #[serde(default)]
    pub host: HostConfig,
    /// Installed extensions, in load order
    #[serde(default)]
    pub extensions: Vec<ExtensionEntry>,
}

/// Host process configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Default: "info"
    pub log_level: String,
    /// Interval between heartbeat events of an enabled extension
    /// Default: 30
    pub heartbeat_secs: u64,
}

/// One installed extension
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtensionEntry {
    /// Path to the extension's package.json; used as its id
    pub manifest_path: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Main-process entry point, relative to the manifest directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    /// Renderer entry point, relative to the manifest directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    /// Whether the extension ships with the host
    #[serde(default)]
    pub bundled: bool,
    /// Enable the extension when the host starts
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            heartbeat_secs: 30,
        }
    }
}

impl ExtensionEntry {
    /// Build the installation record handed to `Extension::new`.
    pub fn to_installed(&self) -> InstalledExtension {
        let manifest = ExtensionManifest {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            main: self.main.clone(),
            renderer: self.renderer.clone(),
        };

        InstalledExtension::new(manifest, self.manifest_path.clone()).bundled(self.bundled)
    }
}

impl Config {
    /// Load configuration from the specified path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default XDG config location
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// file with documented comments.
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_file(&config_path)?;
        }

        Self::load(&config_path)
    }

    /// Get the default configuration file path
    ///
    /// Returns `$XDG_CONFIG_HOME/lens-extension-host/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "lens", "lens-extension-host")
            .context("Failed to determine project directories")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Create a default configuration file with documented comments
    fn create_default_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        tracing::info!("Created default configuration file at: {}", path.display());
        Ok(())
    }

    /// Generate the default configuration file content with comments
    fn default_config_content() -> String {
        r#"# Lens Extension Host Configuration

[host]
# Log level: trace, debug, info, warn, error
# Default: "info"
log_level = "info"

# Seconds between heartbeat events while an extension is enabled
# Default: 30
heartbeat_secs = 30

# Installed extensions
# Each extension is described by:
# - manifest_path: path to its package.json (unique, used as the id)
# - name, version: copied from the manifest
# - description, main, renderer: optional manifest fields
# - bundled: whether the extension ships with the host (default: false)
# - enabled: enable on startup (default: true)

# [[extensions]]
# manifest_path = "/home/user/.lens/extensions/demo/package.json"
# name = "demo"
# version = "1.0.0"
# main = "dist/main.js"
# enabled = true
"#
        .to_string()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.host.log_level.as_str()) {
            anyhow::bail!(
                "Invalid log_level: {}. Must be one of: {}",
                self.host.log_level,
                valid_log_levels.join(", ")
            );
        }

        if self.host.heartbeat_secs == 0 {
            anyhow::bail!("host.heartbeat_secs must be greater than 0");
        }

        let mut seen = HashSet::new();
        for (index, entry) in self.extensions.iter().enumerate() {
            if entry.manifest_path.is_empty() {
                anyhow::bail!("extensions[{}]: manifest_path cannot be empty", index);
            }
            if entry.name.is_empty() {
                anyhow::bail!("Extension '{}': name cannot be empty", entry.manifest_path);
            }
            if entry.version.is_empty() {
                anyhow::bail!("Extension '{}': version cannot be empty", entry.manifest_path);
            }
            if !seen.insert(entry.manifest_path.as_str()) {
                anyhow::bail!("Extension '{}' is listed more than once", entry.manifest_path);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn entry(manifest_path: &str) -> ExtensionEntry {
        ExtensionEntry {
            manifest_path: manifest_path.to_string(),
            name: "demo".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            main: None,
            renderer: None,
            bundled: false,
            enabled: true,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host.log_level, "info");
        assert_eq!(config.host.heartbeat_secs, 30);
        assert!(config.extensions.is_empty());
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[host]
log_level = "debug"
heartbeat_secs = 5

[[extensions]]
manifest_path = "/ext/demo/package.json"
name = "demo"
version = "1.0.0"
description = "Demo extension"
main = "dist/main.js"

[[extensions]]
manifest_path = "/app/extensions/metrics/package.json"
name = "metrics"
version = "2.0.0"
bundled = true
enabled = false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.host.log_level, "debug");
        assert_eq!(config.host.heartbeat_secs, 5);
        assert_eq!(config.extensions.len(), 2);

        let demo = &config.extensions[0];
        assert!(demo.enabled);
        assert!(!demo.bundled);
        assert_eq!(demo.main.as_deref(), Some("dist/main.js"));

        let metrics = &config.extensions[1];
        assert!(!metrics.enabled);
        assert!(metrics.bundled);
    }

    #[test]
    fn test_load_minimal_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"").unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_host_table() {
        let config_content = r#"
[host]
log_level = "debug"

[[extensions]]
manifest_path = "/ext/demo/package.json"
name = "demo"
version = "1.0.0"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.host.log_level, "debug");
        assert_eq!(config.host.heartbeat_secs, 30);
        assert_eq!(config.extensions.len(), 1);
        assert_eq!(config.extensions[0].name, "demo");
    }

    #[test]
    fn test_default_content_parses() {
        let config: Config = toml::from_str(&Config::default_config_content()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.host.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_heartbeat() {
        let mut config = Config::default();
        config.host.heartbeat_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_manifest_path() {
        let mut config = Config::default();
        config.extensions.push(entry("/ext/demo/package.json"));
        config.extensions.push(entry("/ext/demo/package.json"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_fields() {
        let mut config = Config::default();
        config.extensions.push(entry(""));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        let mut nameless = entry("/ext/demo/package.json");
        nameless.name.clear();
        config.extensions.push(nameless);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        let mut versionless = entry("/ext/demo/package.json");
        versionless.version.clear();
        config.extensions.push(versionless);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_installed() {
        let mut e = entry("/ext/demo/package.json");
        e.bundled = true;
        e.renderer = Some("dist/renderer.js".to_string());

        let installed = e.to_installed();
        assert_eq!(installed.manifest_path, "/ext/demo/package.json");
        assert_eq!(installed.manifest.name, "demo");
        assert_eq!(installed.manifest.renderer.as_deref(), Some("dist/renderer.js"));
        assert!(installed.is_bundled);
    }

    #[test]
    fn test_full_config_roundtrip() {
        let mut config = Config::default();
        config.host.log_level = "warn".to_string();
        config.extensions.push(entry("/ext/demo/package.json"));

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
    }
}
