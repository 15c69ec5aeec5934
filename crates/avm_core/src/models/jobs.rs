//! Batch request and per-video job structures.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::volume::VolumeScale;
use crate::merge::SelectionError;

/// Validated input for one "combine" action.
///
/// Can only be built through [`MergeRequest::new`], so a request always has
/// at least one video and an audio source.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRequest {
    videos: Vec<PathBuf>,
    audio: PathBuf,
    volume: VolumeScale,
}

impl MergeRequest {
    /// Validate the user's selection.
    ///
    /// Videos keep the order they were selected in.
    pub fn new(
        videos: Vec<PathBuf>,
        audio: Option<PathBuf>,
        volume: VolumeScale,
    ) -> Result<Self, SelectionError> {
        match audio {
            Some(audio) if !videos.is_empty() => Ok(Self {
                videos,
                audio,
                volume,
            }),
            audio => Err(SelectionError::Missing {
                videos: videos.len(),
                audio: audio.is_some(),
            }),
        }
    }

    pub fn videos(&self) -> &[PathBuf] {
        &self.videos
    }

    pub fn audio(&self) -> &Path {
        &self.audio
    }

    pub fn volume(&self) -> VolumeScale {
        self.volume
    }

    /// Expand into one job per video, numbered from 1.
    pub fn jobs(&self) -> impl Iterator<Item = MergeJob> + '_ {
        self.videos.iter().enumerate().map(|(i, video)| MergeJob {
            index: i + 1,
            video_path: video.clone(),
            volume: self.volume,
        })
    }
}

/// One video + audio combination within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeJob {
    /// 1-based position in the batch.
    pub index: usize,
    pub video_path: PathBuf,
    pub volume: VolumeScale,
}

impl MergeJob {
    /// Display name (file name of the video).
    pub fn name(&self) -> String {
        self.video_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.video_path.display().to_string())
    }
}

/// Result of a successfully committed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    /// The source video as selected.
    pub video_path: PathBuf,
    /// Where the merged video now lives.
    pub final_path: PathBuf,
    pub video_duration_secs: f64,
    pub audio_duration_secs: f64,
    /// How many copies of the source audio were concatenated.
    pub repetitions: usize,
}
