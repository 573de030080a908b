use std::io::{Cursor, Write};

use image::{GrayImage, ImageFormat};
use tracing::debug;

use crate::image_pipeline::capture::MosaicImage;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::mosaic::types::MosaicConfig;
use crate::image_pipeline::mosaic::writer::MosaicWriter;

/// 8-bit grayscale PNG encoder. Compression settings in the config only
/// apply to TIFF and are ignored here.
pub struct PngMosaicWriter;

impl MosaicWriter for PngMosaicWriter {
    fn write_mosaic(&self, image: &MosaicImage, output: &mut dyn Write, _config: &MosaicConfig) -> Result<()> {
        debug!("Encoding PNG mosaic: {}x{}", image.width(), image.height());

        let gray = GrayImage::from_raw(image.width() as u32, image.height() as u32, image.data().to_vec())
            .ok_or_else(|| ConversionError::EncodeError("mosaic buffer does not match its size".into()))?;

        let mut buffer = Vec::new();
        gray.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| ConversionError::EncodeError(e.to_string()))?;

        output
            .write_all(&buffer)
            .map_err(|e| ConversionError::OutputWriteFailure(e.to_string()))?;
        Ok(())
    }
}
