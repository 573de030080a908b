use std::io::Write;
use std::path::Path;

use crate::image_pipeline::capture::MosaicImage;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::mosaic::types::MosaicConfig;

pub trait MosaicWriter {
    fn write_mosaic(&self, image: &MosaicImage, output: &mut dyn Write, config: &MosaicConfig) -> Result<()>;

    /// Writes a mosaic destined for `path`. Writers that choose a container
    /// from the file name override this.
    fn write_mosaic_for(
        &self,
        path: &Path,
        image: &MosaicImage,
        output: &mut dyn Write,
        config: &MosaicConfig,
    ) -> Result<()> {
        let _ = path;
        self.write_mosaic(image, output, config)
    }
}
