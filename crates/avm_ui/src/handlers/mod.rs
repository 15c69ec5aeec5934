//! Handler modules for the main window.
//!
//! File dialogs, config persistence and batch execution live here so the
//! view only renders state.

pub mod browse;
pub mod processing;

pub use processing::BatchSummary;
