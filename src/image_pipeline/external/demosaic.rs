use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tracing::{info, instrument};
use walkdir::WalkDir;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::external::command::ToolCommand;
use crate::image_pipeline::external::pool::{run_bounded, JobReport};

pub const DEFAULT_DEMOSAIC_WORKERS: usize = 5;

/// Settings for the joint demosaic/denoise network runner.
#[derive(Debug, Clone, PartialEq)]
pub struct DemosaicJobConfig {
    /// Interpreter the demosaic script runs under
    pub interpreter: PathBuf,
    pub binary: PathBuf,
    pub model: PathBuf,
    /// Mosaic alignment offsets handed to the network
    pub offset_x: i32,
    pub offset_y: i32,
    pub gpu: bool,
}

impl Default for DemosaicJobConfig {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from("python"),
            binary: PathBuf::from("bin/demosaick"),
            model: PathBuf::from("pretrained_models/bayer/"),
            offset_x: 0,
            offset_y: 0,
            gpu: false,
        }
    }
}

impl DemosaicJobConfig {
    pub fn build_command(&self, mosaic: &Path, output_dir: &Path) -> ToolCommand {
        let cmd = ToolCommand::new(&self.interpreter)
            .arg(&self.binary)
            .arg("--input")
            .arg(mosaic)
            .arg("--output")
            .arg(output_dir)
            .arg("--model")
            .arg(&self.model)
            .arg("--offset_x")
            .arg(self.offset_x.to_string())
            .arg("--offset_y")
            .arg(self.offset_y.to_string());
        if self.gpu { cmd.arg("--gpu") } else { cmd }
    }

    fn require_exists(kind: &str, path: &Path) -> Result<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(ConversionError::InvalidConfig(format!(
                "{}: {} does not exist",
                kind,
                path.display()
            )))
        }
    }

    pub fn validate(&self, mosaic_dir: &Path, output_dir: &Path) -> Result<()> {
        Self::require_exists("Mosaics", mosaic_dir)?;
        Self::require_exists("Outputs", output_dir)?;
        Self::require_exists("Executable", &self.binary)?;
        Self::require_exists("Model", &self.model)
    }
}

/// Demosaics every file under `mosaic_dir` into `output_dir`, at most
/// `workers` network processes at a time.
#[instrument(skip(config, progress))]
pub fn batch_demosaic(
    mosaic_dir: &Path,
    output_dir: &Path,
    config: &DemosaicJobConfig,
    workers: usize,
    verbose: bool,
    progress: &ProgressBar,
) -> Result<JobReport> {
    config.validate(mosaic_dir, output_dir)?;

    let mut mosaics = Vec::new();
    for entry in WalkDir::new(mosaic_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ConversionError::UnreadableInput(e.to_string()))?;
        if entry.file_type().is_file() {
            mosaics.push(entry.into_path());
        }
    }
    info!(mosaics = mosaics.len(), "Queued mosaics for demosaicing");

    let commands = mosaics
        .iter()
        .map(|m| config.build_command(m, output_dir))
        .collect();
    run_bounded(commands, workers, verbose, progress)
}
