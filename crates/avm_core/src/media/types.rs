//! Error types for media probing, decoding and encoding.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from the external media tools.
#[derive(Error, Debug)]
pub enum MediaError {
    /// Input file does not exist.
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The tool binary could not be launched.
    #[error("Failed to run {tool}: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited with an error.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// I/O while talking to the tool or touching output files.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Tool output could not be understood.
    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// Decoding produced no samples.
    #[error("No audio samples decoded from {}", .0.display())]
    EmptyAudio(PathBuf),

    /// The output path is already taken; nothing is written over it.
    #[error("Output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// The produced file is missing or empty.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),
}

impl MediaError {
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: Option<i32>,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code: exit_code.unwrap_or(-1),
            message: message.into(),
        }
    }

    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Tool output attached to the error, one entry per line.
    pub fn output_lines(&self) -> Vec<&str> {
        match self {
            MediaError::CommandFailed { message, .. } => message.lines().collect(),
            _ => Vec::new(),
        }
    }
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Keep the last `max_lines` non-empty lines of tool stderr.
pub(crate) fn stderr_tail(stderr: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
