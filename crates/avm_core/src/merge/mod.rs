//! Merge pipeline: replace the audio of each selected video.
//!
//! For every video of a [`MergeRequest`](crate::models::MergeRequest):
//! 1. probe the video duration
//! 2. loop and trim the batch's source audio to that duration, then scale it
//! 3. encode `<stem>_with_audio_<pct>%.mp4` next to the video
//! 4. delete the original and rename the merged file to `<stem>.mp4`
//!
//! Failures of one video are recorded in the [`BatchReport`] and the batch
//! continues with the next one.

mod errors;
pub mod naming;
mod processor;
mod replace;
mod report;

pub use errors::{MergeError, MergeResult, ReplaceError, SelectionError, SELECTION_WARNING};
pub use naming::{final_path, staging_path};
pub use processor::BatchProcessor;
pub use replace::commit;
pub use report::{BatchReport, JobReport, SUCCESS_MESSAGE};
