use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::external::command::ToolCommand;

#[derive(Debug)]
pub struct JobFailure {
    pub command: ToolCommand,
    pub error: ConversionError,
}

#[derive(Debug, Default)]
pub struct JobReport {
    pub succeeded: usize,
    pub failures: Vec<JobFailure>,
}

impl JobReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// `ExternalToolFailure` naming the first failed job if any job failed.
    pub fn ensure_complete(&self) -> Result<()> {
        summarize_failures(&self.failures, self.succeeded)
    }
}

pub(crate) fn summarize_failures(failures: &[JobFailure], succeeded: usize) -> Result<()> {
    match failures.first() {
        None => Ok(()),
        Some(first) => Err(ConversionError::ExternalToolFailure(format!(
            "{} of {} jobs failed, first: {}",
            failures.len(),
            failures.len() + succeeded,
            first.error
        ))),
    }
}

/// Runs `commands` on a pool of exactly `max_concurrent` threads, so no more
/// than that many children are alive at any moment. A failing job does not
/// stop the others.
pub fn run_bounded(
    commands: Vec<ToolCommand>,
    max_concurrent: usize,
    verbose: bool,
    progress: &ProgressBar,
) -> Result<JobReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_concurrent.max(1))
        .build()
        .map_err(|e| ConversionError::InvalidConfig(e.to_string()))?;

    info!(jobs = commands.len(), max_concurrent, "Starting external jobs");
    progress.set_length(commands.len() as u64);

    let results: Vec<(ToolCommand, Result<()>)> = pool.install(|| {
        commands
            .into_par_iter()
            .map(|command| {
                let result = command.run(verbose);
                progress.inc(1);
                (command, result)
            })
            .collect()
    });

    let mut report = JobReport::default();
    for (command, result) in results {
        match result {
            Ok(()) => report.succeeded += 1,
            Err(error) => {
                warn!("{}", error);
                report.failures.push(JobFailure { command, error });
            }
        }
    }
    info!(
        succeeded = report.succeeded,
        failed = report.failures.len(),
        "External jobs finished"
    );
    Ok(report)
}
