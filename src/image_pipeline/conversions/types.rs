//! Batch configuration and reporting types

use std::path::PathBuf;

use crate::image_pipeline::common::error::ConversionError;
use crate::image_pipeline::manifest::BlankLines;

/// Reaction to a failed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure and return it
    #[default]
    FailFast,
    /// Record the failure and carry on with the remaining items
    SkipAndReport,
}

/// Configuration for batch runs
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Items converted concurrently; 1 keeps manifest order
    pub workers: usize,
    pub failure_policy: FailurePolicy,
    pub blank_lines: BlankLines,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            failure_policy: FailurePolicy::FailFast,
            blank_lines: BlankLines::Skip,
            show_progress: false,
        }
    }
}

impl BatchConfig {
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }
}

/// Builder for BatchConfig
#[derive(Default)]
pub struct BatchConfigBuilder {
    workers: Option<usize>,
    failure_policy: Option<FailurePolicy>,
    blank_lines: Option<BlankLines>,
    show_progress: Option<bool>,
}

impl BatchConfigBuilder {
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    pub fn blank_lines(mut self, blank_lines: BlankLines) -> Self {
        self.blank_lines = Some(blank_lines);
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = Some(show);
        self
    }

    pub fn build(self) -> BatchConfig {
        let default = BatchConfig::default();
        BatchConfig {
            workers: self.workers.unwrap_or(default.workers),
            failure_policy: self.failure_policy.unwrap_or(default.failure_policy),
            blank_lines: self.blank_lines.unwrap_or(default.blank_lines),
            show_progress: self.show_progress.unwrap_or(default.show_progress),
        }
    }
}

#[derive(Debug)]
pub struct ItemFailure {
    pub input: PathBuf,
    pub error: ConversionError,
}

/// Outcome of a batch run, in manifest order
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Written output files
    pub processed: Vec<PathBuf>,
    /// Items skipped under `FailurePolicy::SkipAndReport`
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
