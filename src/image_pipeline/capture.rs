//! Capture reading module
//!
//! Loads 3-channel raw captures from rasters or camera raw files and holds the
//! single-channel mosaics derived from them.

mod reader;
mod image_reader;
mod rawloader_reader;
mod auto_reader;
pub mod types;

pub use reader::CaptureReader;
pub use image_reader::ImageCaptureReader;
pub use rawloader_reader::RawLoaderReader;
pub use auto_reader::AutoCaptureReader;
pub use types::{Channel, MosaicImage, RawCapture};
