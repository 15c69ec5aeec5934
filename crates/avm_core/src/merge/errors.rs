//! Error types for the merge pipeline.
//!
//! Errors carry context that chains through layers:
//! Job (video path) → Stage (decode/encode/replace) → Detail

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::media::MediaError;

/// Warning shown when the user did not pick both inputs.
pub const SELECTION_WARNING: &str = "Please select video and audio files.";

/// The selection cannot start a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// No videos or no audio were chosen.
    #[error("Please select video and audio files.")]
    Missing { videos: usize, audio: bool },
}

/// Why the staging file could not take the original's place.
#[derive(Error, Debug)]
pub enum ReplaceError {
    /// The final name is taken by a different file.
    #[error("{} already exists", .0.display())]
    Collision(PathBuf),

    #[error("failed to delete original: {0}")]
    Delete(#[source] io::Error),

    #[error("failed to rename staging file: {0}")]
    Rename(#[source] io::Error),
}

/// Failure of one job, or of the whole batch when the audio cannot be loaded.
#[derive(Error, Debug)]
pub enum MergeError {
    /// Source unreadable or unsupported.
    #[error("Could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: MediaError,
    },

    /// Producing the merged file failed. The original is untouched.
    #[error("Could not encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: MediaError,
    },

    /// The merged file exists but could not replace the original.
    #[error("Could not replace {} (merged file kept at {}): {source}", .original.display(), .staging.display())]
    Replace {
        original: PathBuf,
        staging: PathBuf,
        #[source]
        source: ReplaceError,
    },
}

impl MergeError {
    pub fn decode(path: impl Into<PathBuf>, source: MediaError) -> Self {
        Self::Decode {
            path: path.into(),
            source,
        }
    }

    pub fn encode(path: impl Into<PathBuf>, source: MediaError) -> Self {
        Self::Encode {
            path: path.into(),
            source,
        }
    }

    pub fn replace(
        original: impl Into<PathBuf>,
        staging: impl Into<PathBuf>,
        source: ReplaceError,
    ) -> Self {
        Self::Replace {
            original: original.into(),
            staging: staging.into(),
            source,
        }
    }

    /// Stage that failed.
    pub fn kind(&self) -> &'static str {
        match self {
            MergeError::Decode { .. } => "decode",
            MergeError::Encode { .. } => "encode",
            MergeError::Replace { .. } => "replace",
        }
    }

    /// The file the error is about.
    pub fn path(&self) -> &Path {
        match self {
            MergeError::Decode { path, .. } | MergeError::Encode { path, .. } => path,
            MergeError::Replace { original, .. } => original,
        }
    }

    /// Merged output left on disk by a failed replacement.
    pub fn kept_output(&self) -> Option<&Path> {
        match self {
            MergeError::Replace { staging, .. } => Some(staging),
            _ => None,
        }
    }
}

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;
