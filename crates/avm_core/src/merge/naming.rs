//! Output file names.
//!
//! Both names live in the source video's directory:
//! - staging: `<stem>_with_audio_<pct>%.mp4`, written by the encoder
//! - final: `<stem>.mp4`, what the staging file is renamed to

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::models::VolumeScale;

fn with_stem_suffix(video: &Path, suffix: &str) -> Option<PathBuf> {
    let stem = video.file_stem()?;
    let mut name = OsString::from(stem);
    name.push(suffix);
    Some(match video.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    })
}

/// Encoder output next to `video`. `None` when the path has no file name.
pub fn staging_path(video: &Path, volume: VolumeScale) -> Option<PathBuf> {
    with_stem_suffix(video, &format!("_with_audio_{}.mp4", volume))
}

/// Name the merged file ends up with.
pub fn final_path(video: &Path) -> Option<PathBuf> {
    with_stem_suffix(video, ".mp4")
}
