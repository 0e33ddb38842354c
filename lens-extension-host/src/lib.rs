//! Lens extension host library
//!
//! This module exports the internal components of the host for testing purposes.

pub mod config;
pub mod error;
pub mod heartbeat;
pub mod hooks;
pub mod registry;

pub use error::{HookError, HostError, HostResult};
pub use registry::{ExtensionInfo, ExtensionRegistry, HostExtension};
