use std::io::Write;

use tiff::encoder::{colortype, compression::DeflateLevel, Compression, TiffEncoder};
use tiff::tags::Predictor;
use tracing::debug;

use crate::image_pipeline::capture::MosaicImage;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::mosaic::types::{MosaicCompression, MosaicConfig};
use crate::image_pipeline::mosaic::writer::MosaicWriter;

/// 8-bit grayscale TIFF encoder.
pub struct StandardTiffWriter;

impl MosaicWriter for StandardTiffWriter {
    fn write_mosaic(&self, image: &MosaicImage, output: &mut dyn Write, config: &MosaicConfig) -> Result<()> {
        debug!("Encoding TIFF mosaic: {}x{}", image.width(), image.height());

        let mut buffer = Vec::new();

        let compression = match config.compression {
            MosaicCompression::None => Compression::Uncompressed,
            MosaicCompression::Lzw => Compression::Lzw,
            MosaicCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            MosaicCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            MosaicCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| ConversionError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if let Some(predictor_val) = config.predictor {
            let predictor = match predictor_val {
                2 => Predictor::Horizontal,
                _ => Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        encoder
            .write_image::<colortype::Gray8>(image.width() as u32, image.height() as u32, image.data())
            .map_err(|e| ConversionError::EncodeError(e.to_string()))?;

        output
            .write_all(&buffer)
            .map_err(|e| ConversionError::OutputWriteFailure(e.to_string()))?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
