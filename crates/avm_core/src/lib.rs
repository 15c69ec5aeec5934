//! AVM Core - Backend logic for Audio Video MergeX
//!
//! This crate contains all merge logic with zero UI dependencies.
//! It can be used by the GUI application or a CLI tool.

pub mod config;
pub mod logging;
pub mod media;
pub mod merge;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
