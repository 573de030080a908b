use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::ProgressBar;

use mosaic_prep_rs::image_pipeline::dataset::{
    convert_dataset, organize_pairs, DatasetMode, PairOrder, DEFAULT_DECODE_WORKERS,
};
use mosaic_prep_rs::image_pipeline::external::{
    batch_demosaic, DecoderConfig, DemosaicJobConfig, JobReport, RawDecoder, DEFAULT_DEMOSAIC_WORKERS,
};
use mosaic_prep_rs::image_pipeline::{
    BatchConfig, BatchPipeline, BlankLines, FailurePolicy, MosaicCompression, MosaicConfig,
};
use mosaic_prep_rs::logger::{self, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "mosaic-prep", about = "Mosaic preparation tools for joint demosaicing and denoising")]
struct Cli {
    /// Debug logging and child process output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pack libraw trichromatic captures into single-channel mosaics
    ToMono {
        /// Image to convert, or a .txt file listing one image per line
        file: PathBuf,
        /// Output directory
        #[arg(long, short, default_value = "./mono/")]
        output: PathBuf,
        /// Files converted in parallel
        #[arg(long, default_value_t = 1)]
        workers: usize,
        /// Report failed files at the end instead of stopping at the first
        #[arg(long)]
        keep_going: bool,
        /// Treat blank manifest lines as (invalid) paths
        #[arg(long)]
        keep_blank_lines: bool,
        /// TIFF compression
        #[arg(long, value_enum, default_value = "none")]
        compression: CompressionArg,
    },
    /// Decode camera raw captures into mosaic TIFFs with dcraw or dcraw_emu
    ConvertRaw {
        /// Dataset root (with Clean/ and Noisy/ unless --test)
        dir: PathBuf,
        /// Output root for the mosaic TIFFs
        output: PathBuf,
        /// Convert a single folder of test captures
        #[arg(long)]
        test: bool,
        /// Use dcraw_emu instead of dcraw
        #[arg(long)]
        libraw: bool,
        /// Don't auto brighten (dcraw only)
        #[arg(long = "W")]
        no_auto_bright: bool,
        /// R G B G multipliers
        #[arg(long = "r", num_args = 4, value_names = ["R", "G", "B", "G2"])]
        multipliers: Option<Vec<f32>>,
        /// Decoder executable (defaults to dcraw / dcraw_emu on PATH)
        #[arg(long)]
        decoder_bin: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_DECODE_WORKERS)]
        workers: usize,
    },
    /// Run the demosaic network over every mosaic in a folder
    Demosaic {
        /// Folder that contains the mosaics
        mosaic_dir: PathBuf,
        /// Folder to hold demosaicked files
        output_dir: PathBuf,
        /// Demosaic executable
        #[arg(long = "bin", default_value = "bin/demosaick")]
        binary: PathBuf,
        /// Model to demosaic with
        #[arg(long, default_value = "pretrained_models/bayer/")]
        model: PathBuf,
        /// Interpreter the executable runs under
        #[arg(long, default_value = "python")]
        interpreter: PathBuf,
        /// Offset x to align mosaic
        #[arg(long, default_value_t = 0)]
        offx: i32,
        /// Offset y to align mosaic
        #[arg(long, default_value_t = 0)]
        offy: i32,
        /// Demosaic on the GPU
        #[arg(long)]
        gpu: bool,
        #[arg(long, default_value_t = DEFAULT_DEMOSAIC_WORKERS)]
        workers: usize,
    },
    /// Split an alternating noisy/clean capture sequence into Clean/ and Noisy/
    OrganizePairs {
        dir: PathBuf,
        /// Batch number used in the new file names
        #[arg(long)]
        batch: u32,
        /// The first frame of the sequence is the clean one
        #[arg(long)]
        clean_first: bool,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CompressionArg {
    None,
    Lzw,
    Deflate,
    DeflateBest,
}

impl From<CompressionArg> for MosaicCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::None => MosaicCompression::None,
            CompressionArg::Lzw => MosaicCompression::Lzw,
            CompressionArg::Deflate => MosaicCompression::DeflateBalanced,
            CompressionArg::DeflateBest => MosaicCompression::DeflateBest,
        }
    }
}

fn progress_bar(verbose: bool) -> ProgressBar {
    if verbose { ProgressBar::hidden() } else { ProgressBar::new(0) }
}

fn report_jobs(report: &JobReport) -> Result<()> {
    for failure in &report.failures {
        error!("{}", failure.error);
    }
    Ok(report.ensure_complete()?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Command::ToMono { file, output, workers, keep_going, keep_blank_lines, compression } => {
            let mosaic_config = MosaicConfig::builder().compression(compression.into()).build();
            let batch_config = BatchConfig::builder()
                .workers(workers)
                .failure_policy(if keep_going { FailurePolicy::SkipAndReport } else { FailurePolicy::FailFast })
                .blank_lines(if keep_blank_lines { BlankLines::Preserve } else { BlankLines::Skip })
                .show_progress(!cli.verbose)
                .build();

            let report = BatchPipeline::new(mosaic_config, batch_config)
                .run(&file, &output)
                .with_context(|| format!("converting {}", file.display()))?;

            info!("Wrote {} mosaic(s) to {}", report.processed.len(), output.display());
            for failure in &report.failures {
                warn!("{}", failure.error);
            }
            if !report.is_complete() {
                bail!("{} file(s) failed", report.failures.len());
            }
        }
        Command::ConvertRaw { dir, output, test, libraw, no_auto_bright, multipliers, decoder_bin, workers } => {
            let multipliers = match multipliers.as_deref() {
                Some([r, g, b, g2]) => Some([*r, *g, *b, *g2]),
                Some(other) => bail!("expected 4 multipliers, got {}", other.len()),
                None => None,
            };
            let decoder = if libraw { RawDecoder::LibRaw } else { RawDecoder::Dcraw };
            let mut decoder_config = DecoderConfig::new(decoder, no_auto_bright, multipliers)?;
            if let Some(bin) = decoder_bin {
                decoder_config = decoder_config.with_program(bin);
            }
            let mode = if test { DatasetMode::Test } else { DatasetMode::Training };

            let progress = progress_bar(cli.verbose);
            let report = convert_dataset(&dir, &output, mode, &decoder_config, workers, cli.verbose, &progress)
                .with_context(|| format!("converting dataset {}", dir.display()))?;
            progress.finish_and_clear();

            info!("Moved {} mosaic(s) into {}", report.moved.len(), output.display());
            for failure in &report.decode_failures {
                error!("{}", failure.error);
            }
            report.ensure_complete()?;
        }
        Command::Demosaic { mosaic_dir, output_dir, binary, model, interpreter, offx, offy, gpu, workers } => {
            let config = DemosaicJobConfig {
                interpreter,
                binary,
                model,
                offset_x: offx,
                offset_y: offy,
                gpu,
            };
            let progress = progress_bar(cli.verbose);
            let report = batch_demosaic(&mosaic_dir, &output_dir, &config, workers, cli.verbose, &progress)?;
            progress.finish_and_clear();
            report_jobs(&report)?;
        }
        Command::OrganizePairs { dir, batch, clean_first } => {
            let order = if clean_first { PairOrder::CleanFirst } else { PairOrder::NoisyFirst };
            let report = organize_pairs(&dir, batch, order)
                .with_context(|| format!("organizing {}", dir.display()))?;
            info!("Organized {} clean and {} noisy frame(s)", report.clean, report.noisy);
        }
    }

    Ok(())
}
