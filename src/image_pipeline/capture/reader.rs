use std::path::Path;

use crate::image_pipeline::capture::types::RawCapture;
use crate::image_pipeline::common::error::Result;

pub trait CaptureReader {
    fn read_capture(&self, data: &[u8]) -> Result<RawCapture>;

    /// Decodes `data` read from `path`. Readers that pick a decoder from the
    /// file name override this.
    fn read_capture_for(&self, path: &Path, data: &[u8]) -> Result<RawCapture> {
        let _ = path;
        self.read_capture(data)
    }
}
