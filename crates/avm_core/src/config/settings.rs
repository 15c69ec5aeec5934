//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::models::VolumeScale;

/// Application directory name under the platform config/data folders.
pub const APP_DIR_NAME: &str = "audio-video-mergex";

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Merge and encoder settings.
    #[serde(default)]
    pub merge: MergeSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Reset out-of-range values to their defaults.
    ///
    /// Returns one message per corrected field.
    pub fn validate(&mut self) -> Vec<String> {
        let mut fixes = Vec::new();
        let defaults = MergeSettings::default();

        if VolumeScale::from_percent(self.merge.default_volume_percent).is_none() {
            fixes.push(format!(
                "merge.default_volume_percent = {} is not one of 10..90 in steps of 10; using {}",
                self.merge.default_volume_percent, defaults.default_volume_percent
            ));
            self.merge.default_volume_percent = defaults.default_volume_percent;
        }

        if self.merge.sample_rate == 0 {
            fixes.push(format!(
                "merge.sample_rate must be positive; using {}",
                defaults.sample_rate
            ));
            self.merge.sample_rate = defaults.sample_rate;
        }

        if !(1..=8).contains(&self.merge.channels) {
            fixes.push(format!(
                "merge.channels = {} is outside 1..8; using {}",
                self.merge.channels, defaults.channels
            ));
            self.merge.channels = defaults.channels;
        }

        for (name, value, default) in [
            ("ffmpeg_path", &mut self.merge.ffmpeg_path, defaults.ffmpeg_path),
            ("ffprobe_path", &mut self.merge.ffprobe_path, defaults.ffprobe_path),
            ("video_codec", &mut self.merge.video_codec, defaults.video_codec),
            ("audio_codec", &mut self.merge.audio_codec, defaults.audio_codec),
        ] {
            if value.trim().is_empty() {
                fixes.push(format!("merge.{} is empty; using {}", name, default));
                *value = default;
            }
        }

        fixes
    }
}

/// Path configuration for logs and dialog start folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Folder the video dialog opened in last time.
    #[serde(default)]
    pub last_video_dir: String,

    /// Folder the audio dialog opened in last time.
    #[serde(default)]
    pub last_audio_dir: String,
}

fn default_logs_folder() -> String {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME).join("logs"))
        .unwrap_or_else(|| PathBuf::from(".logs"))
        .to_string_lossy()
        .to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            logs_folder: default_logs_folder(),
            last_video_dir: String::new(),
            last_audio_dir: String::new(),
        }
    }
}

/// Merge configuration: tools, codecs and PCM layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Volume preselected in the UI, as a percentage.
    #[serde(default = "default_volume_percent")]
    pub default_volume_percent: u8,

    /// FFmpeg executable.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    /// FFprobe executable.
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,

    /// Output video codec.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Output audio codec.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Sample rate audio is decoded and encoded at.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Channel count audio is decoded and encoded with.
    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_volume_percent() -> u8 {
    VolumeScale::default().percent()
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_channels() -> u16 {
    2
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            default_volume_percent: default_volume_percent(),
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
        }
    }
}

impl MergeSettings {
    /// The configured default volume, falling back to 10%.
    pub fn default_volume(&self) -> VolumeScale {
        VolumeScale::from_percent(self.default_volume_percent).unwrap_or_default()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for the application log.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep FFmpeg output out of the batch log unless a job fails.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of FFmpeg output lines to show when a job fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Merge,
    Logging,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 3] = [
        ConfigSection::Paths,
        ConfigSection::Merge,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Merge => "merge",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "# Log folder and last used dialog folders",
            ConfigSection::Merge => "# FFmpeg tools, codecs and audio layout",
            ConfigSection::Logging => "# Logging configuration",
        }
    }
}
