//! Data models for Audio Video MergeX.
//!
//! - `VolumeScale`: the fixed set of volume factors offered to the user
//! - Job structures (requests, per-video jobs, outcomes)

mod jobs;
mod volume;

pub use jobs::{JobOutcome, MergeJob, MergeRequest};
pub use volume::{ParseVolumeError, VolumeScale};
