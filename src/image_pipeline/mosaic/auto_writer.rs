use std::io::Write;
use std::path::Path;

use crate::image_pipeline::capture::MosaicImage;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::mosaic::png_writer::PngMosaicWriter;
use crate::image_pipeline::mosaic::standard_tiff_writer::StandardTiffWriter;
use crate::image_pipeline::mosaic::types::{MosaicConfig, OutputEncoding};
use crate::image_pipeline::mosaic::writer::MosaicWriter;

/// Chooses PNG or TIFF per output path according to `MosaicConfig::encoding`.
pub struct AutoMosaicWriter;

impl MosaicWriter for AutoMosaicWriter {
    fn write_mosaic(&self, image: &MosaicImage, output: &mut dyn Write, config: &MosaicConfig) -> Result<()> {
        match config.encoding {
            OutputEncoding::Png => PngMosaicWriter.write_mosaic(image, output, config),
            OutputEncoding::Auto | OutputEncoding::Tiff => StandardTiffWriter.write_mosaic(image, output, config),
        }
    }

    fn write_mosaic_for(
        &self,
        path: &Path,
        image: &MosaicImage,
        output: &mut dyn Write,
        config: &MosaicConfig,
    ) -> Result<()> {
        match config.encoding.resolve(path) {
            OutputEncoding::Png => PngMosaicWriter.write_mosaic(image, output, config),
            _ => StandardTiffWriter.write_mosaic(image, output, config),
        }
    }
}
