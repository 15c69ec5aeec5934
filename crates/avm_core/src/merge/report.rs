//! Batch results.

use std::path::{Path, PathBuf};

use super::errors::MergeError;
use crate::models::{JobOutcome, MergeJob};

/// Status line after every job succeeded.
pub const SUCCESS_MESSAGE: &str = "Audio combined with videos and saved successfully!";

/// Result of processing a single job.
#[derive(Debug)]
pub struct JobReport {
    /// The job that was processed.
    pub job: MergeJob,
    pub result: Result<JobOutcome, MergeError>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-job results of one batch, in job order.
#[derive(Debug, Default)]
pub struct BatchReport {
    jobs: Vec<JobReport>,
    log_path: Option<PathBuf>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_log_path(mut self, log_path: Option<PathBuf>) -> Self {
        self.log_path = log_path;
        self
    }

    pub(crate) fn push(&mut self, job: MergeJob, result: Result<JobOutcome, MergeError>) {
        self.jobs.push(JobReport { job, result });
    }

    pub fn jobs(&self) -> &[JobReport] {
        &self.jobs
    }

    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    /// Outcomes of the jobs that committed.
    pub fn succeeded(&self) -> Vec<&JobOutcome> {
        self.jobs
            .iter()
            .filter_map(|r| r.result.as_ref().ok())
            .collect()
    }

    /// Failed jobs with their errors.
    pub fn failures(&self) -> Vec<(&MergeJob, &MergeError)> {
        self.jobs
            .iter()
            .filter_map(|r| r.result.as_ref().err().map(|e| (&r.job, e)))
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.jobs.iter().all(JobReport::is_success)
    }

    /// Status line for the UI.
    pub fn summary(&self) -> String {
        if self.is_success() {
            return SUCCESS_MESSAGE.to_string();
        }
        let failed = self.failures().len();
        format!(
            "Combined {} of {} videos; {} failed (see list)",
            self.total() - failed,
            self.total(),
            failed
        )
    }

    /// One line per failed job, for the failure list.
    pub fn failure_lines(&self) -> Vec<String> {
        self.failures()
            .into_iter()
            .map(|(job, err)| format!("{}: {}", job.name(), err))
            .collect()
    }

    /// Log file written for this batch, if any.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }
}
