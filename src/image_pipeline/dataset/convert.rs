use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use regex::Regex;
use tracing::{info, instrument};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::dataset::files::{list_files, move_to_destination, FrameKind};
use crate::image_pipeline::dataset::{CLEAN_DIR, NOISY_DIR};
use crate::image_pipeline::external::{run_bounded, DecoderConfig, JobFailure};
use crate::image_pipeline::external::pool::summarize_failures;

pub const DEFAULT_DECODE_WORKERS: usize = 32;

const RAW_PATTERN: &str = r"^.*\.ARW$";
const MOSAIC_PATTERN: &str = r"^.*\.tiff$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetMode {
    /// `src/Clean` + `src/Noisy` pairs into `out/Clean` + `out/Noisy`
    Training,
    /// A single folder of captures into `out`
    Test,
}

#[derive(Debug, Default)]
pub struct DatasetReport {
    pub moved: Vec<PathBuf>,
    pub decode_failures: Vec<JobFailure>,
}

impl DatasetReport {
    /// Fails if any capture could not be decoded, even when the remaining
    /// mosaics were filed.
    pub fn ensure_complete(&self) -> Result<()> {
        let decoded = self.moved.len();
        summarize_failures(&self.decode_failures, decoded)
    }
}

fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| ConversionError::InvalidConfig(e.to_string()))
}

fn check_counts(what: &str, clean: usize, noisy: usize) -> Result<()> {
    if clean != noisy {
        return Err(ConversionError::DatasetMismatch(format!(
            "{} counts differ: {} clean vs {} noisy",
            what, clean, noisy
        )));
    }
    Ok(())
}

/// Decodes every capture of a dataset to a mosaic TIFF and files the results
/// under sequential `c`/`n`/`t` names in `out`.
///
/// The decoder writes each TIFF beside its capture; those are collected from
/// the source folders afterwards.
#[instrument(skip(decoder, progress))]
pub fn convert_dataset(
    src: &Path,
    out: &Path,
    mode: DatasetMode,
    decoder: &DecoderConfig,
    workers: usize,
    verbose: bool,
    progress: &ProgressBar,
) -> Result<DatasetReport> {
    let raw = pattern(RAW_PATTERN)?;
    let mosaic = pattern(MOSAIC_PATTERN)?;
    info!(decoder = ?decoder.decoder(), program = %decoder.program().display(), "Converting dataset");

    let groups: Vec<(PathBuf, PathBuf, FrameKind)> = match mode {
        DatasetMode::Training => vec![
            (src.join(CLEAN_DIR), out.join(CLEAN_DIR), FrameKind::Clean),
            (src.join(NOISY_DIR), out.join(NOISY_DIR), FrameKind::Noisy),
        ],
        DatasetMode::Test => vec![(src.to_path_buf(), out.to_path_buf(), FrameKind::Test)],
    };

    for (_, dst, _) in &groups {
        std::fs::create_dir_all(dst)
            .map_err(|e| ConversionError::OutputWriteFailure(format!("{}: {}", dst.display(), e)))?;
    }

    let captures = groups
        .iter()
        .map(|(dir, _, _)| list_files(dir, Some(&raw)))
        .collect::<Result<Vec<_>>>()?;
    if mode == DatasetMode::Training {
        check_counts("Capture", captures[0].len(), captures[1].len())?;
    }

    let commands = captures
        .iter()
        .flatten()
        .map(|capture| decoder.build_command(capture))
        .collect();
    let jobs = run_bounded(commands, workers, verbose, progress)?;

    let mosaics = groups
        .iter()
        .map(|(dir, _, _)| list_files(dir, Some(&mosaic)))
        .collect::<Result<Vec<_>>>()?;
    if mode == DatasetMode::Training {
        check_counts("Mosaic", mosaics[0].len(), mosaics[1].len())?;
    }

    let mut report = DatasetReport {
        moved: Vec::new(),
        decode_failures: jobs.failures,
    };
    for ((_, dst, kind), files) in groups.iter().zip(&mosaics) {
        report.moved.extend(move_to_destination(files, dst, *kind)?);
    }

    info!(
        moved = report.moved.len(),
        decode_failures = report.decode_failures.len(),
        "Dataset conversion finished"
    );
    Ok(report)
}
