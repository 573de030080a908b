//! Image processing pipeline module
//!
//! Turns libraw-style 3-channel captures into single-channel Bayer mosaics,
//! one file or a manifest at a time, and drives the external raw decoders and
//! demosaic network used to build training data.

pub mod capture;
pub mod common;
pub mod conversions;
pub mod dataset;
pub mod external;
pub mod manifest;
pub mod mosaic;
pub mod remap;

pub use common::{
    ConversionError,
    Result,
};

pub use capture::{
    AutoCaptureReader,
    CaptureReader,
    Channel,
    ImageCaptureReader,
    MosaicImage,
    RawCapture,
    RawLoaderReader,
};

pub use mosaic::{
    AutoMosaicWriter,
    MosaicCompression,
    MosaicConfig,
    MosaicConfigBuilder,
    MosaicWriter,
    OutputEncoding,
    PngMosaicWriter,
    StandardTiffWriter,
};

pub use conversions::{
    BatchConfig,
    BatchPipeline,
    BatchReport,
    FailurePolicy,
    RawToMosaicPipeline,
};

pub use manifest::{BlankLines, Manifest};
pub use remap::to_monochrome;
