//! Audio Video MergeX - Main entry point
//!
//! This is the application entry point using iced. It handles:
//! - Configuration loading
//! - Application-level logging initialization
//! - Directory creation
//! - Application launch

use std::sync::{Arc, Mutex};

use iced::Size;

use avm_core::config::ConfigManager;
use avm_core::logging::init_tracing_with_file;

mod app;
mod handlers;
mod pages;
mod theme;

use app::App;

fn main() -> iced::Result {
    // Load configuration first (needed for logs directory path)
    let config_path = ConfigManager::default_path();
    let mut config_manager = ConfigManager::new(&config_path);

    if let Err(e) = config_manager.load_or_create() {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
    }

    if let Err(e) = config_manager.ensure_dirs_exist() {
        eprintln!("Warning: Failed to create directories: {}", e);
    }

    let logs_dir = config_manager.logs_folder();
    let level = config_manager.settings().logging.level;
    let _log_guard = init_tracing_with_file(level, &logs_dir);

    tracing::info!("Audio Video MergeX starting");
    tracing::info!("Config: {}", config_path.display());
    tracing::info!("Logs: {}", logs_dir.display());
    tracing::info!("Core version: {}", avm_core::version());

    let config = Arc::new(Mutex::new(config_manager));

    iced::application(move || App::new(config.clone()), App::update, App::view)
        .title(app::WINDOW_TITLE)
        .window_size(Size::new(480.0, 360.0))
        .run()
}
