//! External tool orchestration
//!
//! Raw decoders and the demosaic binary are run as child processes from
//! argument vectors, never through a shell, with at most N running at once.

mod command;
pub(crate) mod pool;
mod raw_decoder;
mod demosaic;

pub use command::ToolCommand;
pub use pool::{run_bounded, JobFailure, JobReport};
pub use raw_decoder::{DecoderConfig, RawDecoder};
pub use demosaic::{batch_demosaic, DemosaicJobConfig, DEFAULT_DEMOSAIC_WORKERS};
