use tracing::debug;

use crate::image_pipeline::capture::reader::CaptureReader;
use crate::image_pipeline::capture::types::RawCapture;
use crate::image_pipeline::common::error::{ConversionError, Result};

/// Reads 3-channel rasters (TIFF, PNG, BMP) through the `image` crate.
///
/// The format is guessed from the leading bytes, so files with unrelated
/// extensions (e.g. `.raw` holding a TIFF written by dcraw) still decode.
/// 16-bit rasters are narrowed to 8 bits.
pub struct ImageCaptureReader;

impl CaptureReader for ImageCaptureReader {
    fn read_capture(&self, data: &[u8]) -> Result<RawCapture> {
        debug!("Decoding raster, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| ConversionError::UnreadableInput(format!("cannot decode: {}", e)))?;

        let color = decoded.color();
        if color.channel_count() != 3 {
            return Err(ConversionError::UnreadableInput(format!(
                "expected a 3-channel image, got {:?}",
                color
            )));
        }

        let rgb = decoded.into_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        debug!("Decoded raster: {}x{} ({:?})", width, height, color);

        RawCapture::new(width, height, rgb.into_raw())
    }
}
