//! Mosaic writing module
//!
//! Lossless single-channel encoders for remapped mosaics.

mod writer;
mod standard_tiff_writer;
mod png_writer;
mod auto_writer;
pub mod types;

pub use writer::MosaicWriter;
pub use standard_tiff_writer::StandardTiffWriter;
pub use png_writer::PngMosaicWriter;
pub use auto_writer::AutoMosaicWriter;
pub use types::{MosaicCompression, MosaicConfig, MosaicConfigBuilder, OutputEncoding};
