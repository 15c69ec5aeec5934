//! Main application module for Audio Video MergeX.
//!
//! Holds the application state and routes messages to the handlers.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use iced::{Element, Task};

use avm_core::config::ConfigManager;
use avm_core::models::VolumeScale;

use crate::handlers::BatchSummary;
use crate::pages;

pub const WINDOW_TITLE: &str = "Audio Video MergeX";

/// All possible messages the application can receive.
#[derive(Debug, Clone)]
pub enum Message {
    /// "Combine Audio with Videos" was clicked.
    CombinePressed,
    /// Both file dialogs closed.
    SelectionMade {
        videos: Vec<PathBuf>,
        audio: Option<PathBuf>,
    },
    VolumeSelected(VolumeScale),
    BatchFinished(BatchSummary),
    WarningClosed,
}

/// Main application state.
pub struct App {
    pub config: Arc<Mutex<ConfigManager>>,

    pub volume: VolumeScale,
    pub status_text: String,
    pub failures: Vec<String>,
    pub log_path: Option<PathBuf>,
    /// The file dialogs are open.
    pub awaiting_selection: bool,
    pub is_processing: bool,
}

impl App {
    pub fn new(config: Arc<Mutex<ConfigManager>>) -> (Self, Task<Message>) {
        let volume = lock(&config).settings().merge.default_volume();

        let app = Self {
            config,
            volume,
            status_text: "Ready".to_string(),
            failures: Vec::new(),
            log_path: None,
            awaiting_selection: false,
            is_processing: false,
        };
        (app, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::CombinePressed => {
                if !self.can_combine() {
                    return Task::none();
                }
                self.awaiting_selection = true;
                self.select_inputs()
            }
            Message::SelectionMade { videos, audio } => self.handle_selection(videos, audio),
            Message::VolumeSelected(volume) => {
                self.handle_volume_selected(volume);
                Task::none()
            }
            Message::BatchFinished(summary) => {
                self.handle_batch_finished(summary);
                Task::none()
            }
            Message::WarningClosed => Task::none(),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        pages::main_window::view(self)
    }

    /// Neither a selection nor a batch is in progress.
    pub fn can_combine(&self) -> bool {
        !self.awaiting_selection && !self.is_processing
    }

    /// Volume applied to the next batch.
    pub fn selected_volume(&self) -> VolumeScale {
        self.volume
    }

    /// Lock the shared config.
    pub fn config(&self) -> MutexGuard<'_, ConfigManager> {
        lock(&self.config)
    }
}

// A panic while holding the lock leaves the settings usable.
fn lock(config: &Mutex<ConfigManager>) -> MutexGuard<'_, ConfigManager> {
    config.lock().unwrap_or_else(PoisonError::into_inner)
}
