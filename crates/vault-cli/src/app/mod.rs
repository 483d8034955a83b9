//! Application-level utilities for the Vault CLI.
//!
//! This module provides:
//! - Application context for unified CLI + config handling
//! - Path and user resolution
//! - Unlocking with retry logic

mod context;
mod resolver;
mod session;

// Re-export public API
pub use context::AppContext;
pub use resolver::resolve_config_path;
