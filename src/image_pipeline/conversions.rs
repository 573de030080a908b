//! Pipeline conversions module
//!
//! Orchestrates capture decoding, remapping and mosaic encoding for one file
//! or for a whole manifest.

mod raw_to_mosaic;
mod batch;
pub mod types;

#[cfg(test)]
mod tests;

pub use raw_to_mosaic::RawToMosaicPipeline;
pub use batch::BatchPipeline;
pub use types::{BatchConfig, BatchConfigBuilder, BatchReport, FailurePolicy, ItemFailure};
