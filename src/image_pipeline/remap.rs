//! Bayer remapping of libraw-style 3-channel captures.
//!
//! The source layout keeps each photosite in the plane of its colour, with a
//! second blue estimate (B') parked on the red sites of channel 2:
//!
//! ```text
//! ch0: R . R .    ch1: . G . G    ch2: B' .  B' .
//!      . . . .         G . G .         .  B  .  B
//! ```
//!
//! The output is the single-channel RGGB mosaic
//!
//! ```text
//! R G R G
//! G B G B
//! ```

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::image_pipeline::capture::{Channel, MosaicImage, RawCapture};
use crate::image_pipeline::common::error::{ConversionError, Result};

/// Squeezes a 3-channel capture into an RGGB mosaic of the same size.
///
/// Red and green sites copy their own plane unchanged. Blue sites take the
/// brighter of the co-located B sample and the B' sample at the origin of the
/// same 2x2 block. No other smoothing or rescaling happens.
///
/// # Arguments
///
/// * `capture` - Libraw-style capture with even, non-zero width and height
///
/// # Returns
///
/// * `Ok(MosaicImage)` - Single-channel mosaic with the capture's geometry
/// * `Err(ConversionError::InvalidDimensions)` - Odd or zero width/height;
///   nothing is produced
///
/// # Examples
///
/// ```
/// use mosaic_prep_rs::image_pipeline::{to_monochrome, RawCapture};
///
/// let capture = RawCapture::zeroed(4, 2);
/// let mosaic = to_monochrome(&capture).unwrap();
/// assert_eq!((mosaic.width(), mosaic.height()), (4, 2));
///
/// assert!(to_monochrome(&RawCapture::zeroed(3, 2)).is_err());
/// ```
#[instrument(skip(capture), fields(width = capture.width(), height = capture.height()))]
pub fn to_monochrome(capture: &RawCapture) -> Result<MosaicImage> {
    let (width, height) = (capture.width(), capture.height());
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(ConversionError::InvalidDimensions(width, height));
    }

    let mut data = vec![0u8; width * height];
    data.par_chunks_mut(width * 2)
        .enumerate()
        .for_each(|(pair, rows)| {
            let top = pair * 2;
            let (even_row, odd_row) = rows.split_at_mut(width);
            for col in (0..width).step_by(2) {
                even_row[col] = capture.sample(top, col, Channel::Red);
                even_row[col + 1] = capture.sample(top, col + 1, Channel::Green);
                odd_row[col] = capture.sample(top + 1, col, Channel::Green);
                odd_row[col + 1] = capture
                    .sample(top + 1, col + 1, Channel::Blue)
                    .max(capture.sample(top, col, Channel::Blue));
            }
        });

    debug!("Remapped {}x{} capture", width, height);
    let mosaic = MosaicImage::new(width, height, data)?;
    debug_assert_eq!(mosaic.data().len(), width * height);
    Ok(mosaic)
}
