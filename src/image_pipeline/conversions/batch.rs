use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::image_pipeline::{
    capture::{AutoCaptureReader, CaptureReader},
    common::error::{ConversionError, Result},
    conversions::raw_to_mosaic::RawToMosaicPipeline,
    conversions::types::{BatchConfig, BatchReport, FailurePolicy, ItemFailure},
    manifest::Manifest,
    mosaic::{AutoMosaicWriter, MosaicConfig, MosaicWriter},
};

/// Runs [`RawToMosaicPipeline`] over every entry of a manifest, writing each
/// mosaic under the output directory with the source's file name.
pub struct BatchPipeline<R: CaptureReader, W: MosaicWriter> {
    converter: RawToMosaicPipeline<R, W>,
    config: BatchConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl BatchPipeline<AutoCaptureReader, AutoMosaicWriter> {
    pub fn new(mosaic_config: MosaicConfig, config: BatchConfig) -> Self {
        Self::with_converter(RawToMosaicPipeline::new(mosaic_config), config)
    }
}

impl<R, W> BatchPipeline<R, W>
where
    R: CaptureReader + Sync,
    W: MosaicWriter + Sync,
{
    pub fn with_converter(converter: RawToMosaicPipeline<R, W>, config: BatchConfig) -> Self {
        Self {
            converter,
            config,
            cancel: None,
        }
    }

    /// Items not yet started are abandoned once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// `output_dir` joined with the base name of `input`.
    pub fn output_path_for(input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let name = input.file_name().ok_or_else(|| {
            ConversionError::UnreadableInput(format!("{:?} has no file name", input))
        })?;
        Ok(output_dir.join(name))
    }

    /// Resolves `input` and converts every entry into `output_dir`.
    ///
    /// `output_dir` is created if missing; an existing directory is reused.
    /// Each output keeps its source's file name.
    ///
    /// # Arguments
    ///
    /// * `input` - A single capture, or a `.txt` manifest with one path per line
    /// * `output_dir` - Directory receiving the mosaics
    ///
    /// # Returns
    ///
    /// * `Ok(BatchReport)` - Written outputs, plus skipped items under
    ///   `FailurePolicy::SkipAndReport`
    /// * `Err(ConversionError::Item { path, .. })` - First failing item under
    ///   `FailurePolicy::FailFast`
    /// * `Err(ConversionError::ManifestParseFailure)` - Manifest not readable
    /// * `Err(ConversionError::Cancelled)` - Cancel flag set before all items ran
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use mosaic_prep_rs::image_pipeline::{BatchConfig, BatchPipeline, MosaicConfig};
    ///
    /// let pipeline = BatchPipeline::new(MosaicConfig::default(), BatchConfig::default());
    /// let report = pipeline.run(Path::new("captures.txt"), Path::new("mono")).unwrap();
    /// println!("{} mosaics written", report.processed.len());
    /// ```
    pub fn run(&self, input: &Path, output_dir: &Path) -> Result<BatchReport> {
        let manifest = Manifest::resolve(input, self.config.blank_lines)?;
        self.run_manifest(&manifest, output_dir)
    }

    #[instrument(skip(self, manifest), fields(items = manifest.len(), output = %output_dir.display()))]
    pub fn run_manifest(&self, manifest: &Manifest, output_dir: &Path) -> Result<BatchReport> {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            ConversionError::OutputWriteFailure(format!("{}: {}", output_dir.display(), e))
        })?;

        let progress = self.progress_bar(manifest.len());
        let halt = AtomicBool::new(false);
        let entries = manifest.entries();

        let outcomes: Vec<Option<Result<PathBuf>>> = if self.config.workers <= 1 {
            entries
                .iter()
                .map(|path| self.process_one(path, output_dir, &halt, &progress))
                .collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()
                .map_err(|e| ConversionError::InvalidConfig(e.to_string()))?;
            pool.install(|| {
                entries
                    .par_iter()
                    .map(|path| self.process_one(path, output_dir, &halt, &progress))
                    .collect()
            })
        };
        progress.finish_and_clear();

        let abandoned = outcomes.iter().any(Option::is_none);
        let mut report = BatchReport::default();
        for (path, outcome) in entries.iter().zip(outcomes) {
            match outcome {
                Some(Ok(output)) => report.processed.push(output),
                Some(Err(error)) => match self.config.failure_policy {
                    FailurePolicy::FailFast => return Err(error),
                    FailurePolicy::SkipAndReport => report.failures.push(ItemFailure {
                        input: path.clone(),
                        error,
                    }),
                },
                None => {}
            }
        }

        if abandoned {
            return Err(ConversionError::Cancelled);
        }

        info!(
            processed = report.processed.len(),
            failed = report.failures.len(),
            "Batch complete"
        );
        Ok(report)
    }

    /// `None` when the item was never started because of a halt or cancel.
    fn process_one(
        &self,
        input: &Path,
        output_dir: &Path,
        halt: &AtomicBool,
        progress: &ProgressBar,
    ) -> Option<Result<PathBuf>> {
        if halt.load(Ordering::SeqCst) || self.is_cancelled() {
            return None;
        }

        let result = Self::output_path_for(input, output_dir)
            .and_then(|output| self.converter.convert_file(input, &output).map(|_| output))
            .map_err(|e| ConversionError::at(input, e));

        if let Err(e) = &result {
            warn!("{}", e);
            if self.config.failure_policy == FailurePolicy::FailFast {
                halt.store(true, Ordering::SeqCst);
            }
        }
        progress.inc(1);
        Some(result)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}<{eta}] {msg}") {
            bar.set_style(style);
        }
        bar
    }
}
