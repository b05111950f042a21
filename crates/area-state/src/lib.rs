//! Navigation state for Area Router
//!
//! This crate provides the navigation engine and everything it owns: the
//! per-area route state, the element registry, history backends and the
//! router configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod history;
pub mod navigator;
pub mod registry;
pub mod state;

pub use config::{ConfigError, RouterConfig};
pub use history::{HistoryBackend, HistoryEntry, HistoryError, MemoryHistory};
pub use navigator::{AreaOutlet, AreaRouter, NavigationError, NavigationOutcome};
pub use registry::{ElementRegistry, RegistryError};
pub use state::{AreaStatus, RouterEvent, RouterState};
