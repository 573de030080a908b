use std::path::Path;

use tracing::debug;

use crate::image_pipeline::capture::image_reader::ImageCaptureReader;
use crate::image_pipeline::capture::rawloader_reader::RawLoaderReader;
use crate::image_pipeline::capture::reader::CaptureReader;
use crate::image_pipeline::capture::types::RawCapture;
use crate::image_pipeline::common::error::Result;

const CAMERA_RAW_EXTENSIONS: &[&str] = &[
    "arw", "srf", "sr2", "cr2", "crw", "nef", "nrw", "dng", "raf", "orf", "rw2", "pef", "srw",
    "3fr", "erf", "kdc", "mef", "mos", "iiq",
];

/// Default reader: camera raw files go through rawloader, everything else
/// through the raster decoder.
pub struct AutoCaptureReader;

impl AutoCaptureReader {
    pub fn is_camera_raw(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| CAMERA_RAW_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl CaptureReader for AutoCaptureReader {
    fn read_capture(&self, data: &[u8]) -> Result<RawCapture> {
        ImageCaptureReader
            .read_capture(data)
            .or_else(|raster_err| {
                RawLoaderReader.read_capture(data).map_err(|raw_err| {
                    debug!("Camera raw fallback failed: {}", raw_err);
                    raster_err
                })
            })
    }

    fn read_capture_for(&self, path: &Path, data: &[u8]) -> Result<RawCapture> {
        if Self::is_camera_raw(path) {
            debug!("{}: camera raw decoder", path.display());
            RawLoaderReader.read_capture(data)
        } else {
            ImageCaptureReader.read_capture(data)
        }
    }
}
