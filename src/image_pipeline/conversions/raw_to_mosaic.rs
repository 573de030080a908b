use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};

use crate::image_pipeline::{
    capture::{AutoCaptureReader, CaptureReader, MosaicImage},
    common::error::{ConversionError, Result},
    mosaic::{AutoMosaicWriter, MosaicConfig, MosaicWriter},
    remap::to_monochrome,
};

/// Decode -> remap -> encode for a single capture.
pub struct RawToMosaicPipeline<R: CaptureReader, W: MosaicWriter> {
    reader: R,
    writer: W,
    config: MosaicConfig,
}

impl RawToMosaicPipeline<AutoCaptureReader, AutoMosaicWriter> {
    pub fn new(config: MosaicConfig) -> Self {
        Self {
            reader: AutoCaptureReader,
            writer: AutoMosaicWriter,
            config,
        }
    }
}

impl<R: CaptureReader, W: MosaicWriter> RawToMosaicPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: MosaicConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    /// Decodes `input_data` (read from `input_path`) and remaps it.
    pub fn remap(&self, input_path: &Path, input_data: &[u8]) -> Result<MosaicImage> {
        let capture = {
            let _span = tracing::info_span!("decode_capture").entered();
            self.reader.read_capture_for(input_path, input_data)?
        };

        let _span = tracing::info_span!(
            "remap",
            width = capture.width(),
            height = capture.height()
        )
        .entered();
        to_monochrome(&capture)
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<()> {
        let capture = {
            let _span = tracing::info_span!("decode_capture").entered();
            self.reader.read_capture(input_data)?
        };

        let mosaic = {
            let _span = tracing::info_span!("remap").entered();
            to_monochrome(&capture)?
        };

        {
            let _span = tracing::info_span!("encode_mosaic").entered();
            self.writer.write_mosaic(&mosaic, output, &self.config)?;
        }

        info!(
            width = mosaic.width(),
            height = mosaic.height(),
            "Conversion complete"
        );
        Ok(())
    }

    /// Converts one file on disk.
    ///
    /// The reader and writer are chosen from the input and output paths. The
    /// output file is only created once the mosaic has been encoded, so a
    /// failed decode leaves nothing behind.
    ///
    /// # Arguments
    ///
    /// * `input_path` - Raster or camera raw capture
    /// * `output_path` - Destination file, overwritten if present
    ///
    /// # Returns
    ///
    /// * `Ok(MosaicImage)` - The mosaic that was written
    /// * `Err(ConversionError::UnreadableInput)` - Missing or undecodable input
    /// * `Err(ConversionError::InvalidDimensions)` - Odd-sized capture
    /// * `Err(ConversionError::OutputWriteFailure)` - Destination not writable
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mosaic_prep_rs::image_pipeline::{MosaicConfig, RawToMosaicPipeline};
    ///
    /// let pipeline = RawToMosaicPipeline::new(MosaicConfig::default());
    /// let mosaic = pipeline.convert_file("captures/DSC01234.tiff", "mono/DSC01234.tiff").unwrap();
    /// println!("{}x{}", mosaic.width(), mosaic.height());
    /// ```
    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<MosaicImage> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ConversionError::UnreadableInput(format!("{}: {}", input_path.display(), e))
            })?
        };

        let mosaic = self.remap(input_path, &input_data)?;

        let mut encoded = Vec::new();
        {
            let _span = tracing::info_span!("encode_mosaic").entered();
            self.writer
                .write_mosaic_for(output_path, &mosaic, &mut encoded, &self.config)?;
        }

        {
            let _span = tracing::info_span!("write_output_file").entered();
            std::fs::write(output_path, &encoded).map_err(|e| {
                ConversionError::OutputWriteFailure(format!("{}: {}", output_path.display(), e))
            })?;
        }

        Ok(mosaic)
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MosaicConfig) {
        self.config = config;
    }
}
