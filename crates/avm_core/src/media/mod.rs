//! Media access for the merge pipeline.
//!
//! This module provides:
//! - `AudioTrack`: decoded PCM with value-semantics transforms
//! - `MediaBackend`: the seam between the merge logic and the external tool
//! - `FfmpegBackend`: the production backend running `ffmpeg`/`ffprobe`
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use avm_core::config::MergeSettings;
//! use avm_core::media::{FfmpegBackend, MediaBackend};
//!
//! let backend = FfmpegBackend::from_settings(&MergeSettings::default());
//! let duration = backend.probe_duration(Path::new("clip.mp4")).unwrap();
//! let audio = backend.decode_audio(Path::new("loop.mp3")).unwrap();
//! let (working, _reps) = audio.fit_and_scale(duration, 0.5);
//! ```

mod audio;
mod command;
mod ffmpeg;
mod types;

use std::path::Path;

pub use audio::AudioTrack;
pub use command::{EncodeParams, FfmpegCommand};
pub use ffmpeg::FfmpegBackend;
pub use types::{MediaError, MediaResult};

/// Everything needed to encode one merged file.
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    /// Source of the picture stream.
    pub video_path: &'a Path,
    /// Replacement audio, already fitted and scaled.
    pub audio: &'a AudioTrack,
    /// Staging file to write.
    pub output_path: &'a Path,
    /// Length of the output in seconds.
    pub duration_secs: f64,
}

/// Trait for media backends.
///
/// Implementations probe durations, decode audio to PCM, and encode a video
/// with its audio replaced.
pub trait MediaBackend: Send + Sync {
    /// Container duration in seconds.
    fn probe_duration(&self, path: &Path) -> MediaResult<f64>;

    /// Decode the first audio stream of `path`.
    fn decode_audio(&self, path: &Path) -> MediaResult<AudioTrack>;

    /// Write `request.output_path`.
    ///
    /// Returns `Ok` only once the file is complete and flushed to disk.
    /// An existing file at the output path is never written over.
    fn encode_merged(&self, request: &EncodeRequest<'_>) -> MediaResult<()>;

    /// Command line `decode_audio` runs, for the batch log.
    fn decode_command_line(&self, _path: &Path) -> Option<String> {
        None
    }

    /// Command line `encode_merged` runs, for the batch log.
    fn encode_command_line(&self, _request: &EncodeRequest<'_>) -> Option<String> {
        None
    }

    /// Get the backend name.
    fn name(&self) -> &str;
}
