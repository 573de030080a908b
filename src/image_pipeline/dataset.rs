//! Training-set organisation
//!
//! Splits alternating capture sequences into clean/noisy pairs, decodes them
//! into mosaics with an external raw decoder and files the results under
//! sequential names.

mod files;
mod pairs;
mod convert;

pub use files::{list_files, move_to_destination, FrameKind};
pub use pairs::{organize_pairs, PairOrder, PairReport};
pub use convert::{convert_dataset, DatasetMode, DatasetReport, DEFAULT_DECODE_WORKERS};

pub const CLEAN_DIR: &str = "Clean";
pub const NOISY_DIR: &str = "Noisy";
