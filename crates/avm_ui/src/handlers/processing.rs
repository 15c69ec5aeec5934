//! Batch processing handlers.

use std::path::PathBuf;

use iced::Task;

use avm_core::config::Settings;
use avm_core::logging::{JobLogger, LogConfig};
use avm_core::media::FfmpegBackend;
use avm_core::merge::{BatchProcessor, BatchReport, MergeError};
use avm_core::models::MergeRequest;

use crate::app::{App, Message};

/// What the window shows once a batch is over.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub status: String,
    pub failures: Vec<String>,
    pub log_path: Option<PathBuf>,
}

impl BatchSummary {
    pub fn from_report(report: &BatchReport) -> Self {
        Self {
            status: report.summary(),
            failures: report.failure_lines(),
            log_path: report.log_path().map(|p| p.to_path_buf()),
        }
    }

    /// The batch stopped before touching any video.
    pub fn fatal(error: impl std::fmt::Display, log_path: Option<PathBuf>) -> Self {
        Self {
            status: format!("Failed: {}", error),
            failures: Vec::new(),
            log_path,
        }
    }
}

impl App {
    /// Validate the dialog results and start the batch.
    pub fn handle_selection(
        &mut self,
        videos: Vec<PathBuf>,
        audio: Option<PathBuf>,
    ) -> Task<Message> {
        self.awaiting_selection = false;
        if self.is_processing {
            tracing::warn!("Selection ignored: a batch is already running");
            return Task::none();
        }

        let request = match MergeRequest::new(videos, audio, self.selected_volume()) {
            Ok(request) => request,
            Err(e) => {
                tracing::info!("Selection incomplete: {:?}", e);
                return show_warning(e.to_string());
            }
        };

        self.remember_dirs(request.videos(), request.audio());

        let settings = self.config().settings().clone();

        self.is_processing = true;
        self.failures.clear();
        self.log_path = None;
        self.status_text = format!(
            "Combining audio with {} video(s) at {}...",
            request.videos().len(),
            request.volume()
        );

        Task::perform(run_batch(request, settings), Message::BatchFinished)
    }

    /// Handle BatchFinished - show the outcome.
    pub fn handle_batch_finished(&mut self, summary: BatchSummary) {
        self.is_processing = false;
        self.status_text = summary.status;
        self.failures = summary.failures;
        self.log_path = summary.log_path;
    }
}

fn show_warning(message: String) -> Task<Message> {
    Task::perform(
        async move {
            rfd::AsyncMessageDialog::new()
                .set_level(rfd::MessageLevel::Warning)
                .set_title("Warning")
                .set_description(message)
                .set_buttons(rfd::MessageButtons::Ok)
                .show()
                .await;
        },
        |_| Message::WarningClosed,
    )
}

/// Run a whole batch off the UI thread.
async fn run_batch(request: MergeRequest, settings: Settings) -> BatchSummary {
    let result = tokio::task::spawn_blocking(move || {
        let backend = FfmpegBackend::from_settings(&settings.merge);
        let mut processor = BatchProcessor::new(backend);

        let log_config = LogConfig::from_settings(&settings.logging);
        match JobLogger::for_batch(&settings.paths.logs_folder, log_config) {
            Ok(logger) => processor = processor.with_logger(logger),
            Err(e) => tracing::warn!("Batch log disabled: {}", e),
        }

        match processor.process(&request) {
            Ok(report) => BatchSummary::from_report(&report),
            Err(e) => fatal_summary(&e, processor.log_path().map(|p| p.to_path_buf())),
        }
    })
    .await;

    result.unwrap_or_else(|e| BatchSummary::fatal(format!("Task panicked: {}", e), None))
}

fn fatal_summary(error: &MergeError, log_path: Option<PathBuf>) -> BatchSummary {
    tracing::error!("Batch aborted: {}", error);
    BatchSummary::fatal(error, log_path)
}
