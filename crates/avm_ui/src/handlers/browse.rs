//! File browsing handlers.

use std::path::{Path, PathBuf};

use iced::Task;

use avm_core::config::ConfigSection;
use avm_core::models::VolumeScale;

use crate::app::{App, Message};

impl App {
    /// Ask for the videos, then the audio. Both dialogs are shown every time.
    pub fn select_inputs(&self) -> Task<Message> {
        if self.is_processing {
            return Task::none();
        }

        let (video_dir, audio_dir) = {
            let cfg = self.config();
            let paths = &cfg.settings().paths;
            (start_dir(&paths.last_video_dir), start_dir(&paths.last_audio_dir))
        };

        Task::perform(
            async move {
                let videos = select_videos(video_dir).await;
                let audio = select_audio(audio_dir).await;
                (videos, audio)
            },
            |(videos, audio)| Message::SelectionMade { videos, audio },
        )
    }

    /// Remember where the user picked files from.
    pub fn remember_dirs(&mut self, videos: &[PathBuf], audio: &Path) {
        let mut cfg = self.config();
        let paths = &mut cfg.settings_mut().paths;
        if let Some(dir) = videos.first().and_then(|v| v.parent()) {
            paths.last_video_dir = dir.to_string_lossy().to_string();
        }
        if let Some(dir) = audio.parent() {
            paths.last_audio_dir = dir.to_string_lossy().to_string();
        }
        if let Err(e) = cfg.update_section(ConfigSection::Paths) {
            tracing::warn!("Failed to save last used folders: {}", e);
        }
    }

    /// Handle a new pick list value; persisted as the next default.
    pub fn handle_volume_selected(&mut self, volume: VolumeScale) {
        self.volume = volume;

        let mut cfg = self.config();
        cfg.settings_mut().merge.default_volume_percent = volume.percent();
        if let Err(e) = cfg.update_section(ConfigSection::Merge) {
            tracing::warn!("Failed to save volume: {}", e);
        }
    }
}

fn start_dir(dir: &str) -> Option<PathBuf> {
    let dir = PathBuf::from(dir);
    (!dir.as_os_str().is_empty() && dir.is_dir()).then_some(dir)
}

async fn select_videos(dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut dialog = rfd::AsyncFileDialog::new()
        .set_title("Select video files")
        .add_filter("MP4 files", &["mp4"])
        .add_filter("All files", &["*"]);
    if let Some(dir) = dir {
        dialog = dialog.set_directory(dir);
    }

    dialog
        .pick_files()
        .await
        .map(|files| files.iter().map(|f| f.path().to_path_buf()).collect())
        .unwrap_or_default()
}

async fn select_audio(dir: Option<PathBuf>) -> Option<PathBuf> {
    let mut dialog = rfd::AsyncFileDialog::new()
        .set_title("Select audio file")
        .add_filter("MP3 files", &["mp3"])
        .add_filter("All files", &["*"]);
    if let Some(dir) = dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_file().await.map(|f| f.path().to_path_buf())
}
