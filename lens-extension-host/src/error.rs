//! Error types for the extension host.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the host's activation hooks.
#[derive(Error, Debug)]
pub enum HookError {
    /// The manifest declares an entry point that is not on disk.
    #[error("Extension {extension}: entry point not found: {}", path.display())]
    MissingEntryPoint { extension: String, path: PathBuf },
}

/// Errors that can occur while managing extensions.
#[derive(Error, Debug)]
pub enum HostError {
    /// No extension is registered under the given id.
    #[error("Extension not found: {0}")]
    ExtensionNotFound(String),

    /// An extension with the same id is already registered.
    #[error("Extension is already loaded: {0}")]
    AlreadyLoaded(String),

    /// An activation or deactivation hook failed.
    #[error("Hook failed: {0}")]
    Hook(#[from] HookError),
}

/// Result type for host operations.
pub type HostResult<T> = std::result::Result<T, HostError>;
