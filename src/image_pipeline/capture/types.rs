//! Capture and mosaic data types

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Colour plane of a [`RawCapture`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Channel {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Three-channel sensor capture, 8 bits per sample, interleaved row-major
/// (`[R, G, B, R, G, B, ...]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCapture {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RawCapture {
    pub const CHANNELS: usize = 3;

    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height * Self::CHANNELS;
        if data.len() != expected {
            return Err(ConversionError::UnreadableInput(format!(
                "capture buffer holds {} samples, expected {} for {}x{}x3",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    /// All-zero capture, mostly useful for tests and benches.
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * Self::CHANNELS],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn sample(&self, row: usize, col: usize, channel: Channel) -> u8 {
        self.data[(row * self.width + col) * Self::CHANNELS + channel.index()]
    }
}

/// Single-channel Bayer mosaic with the same geometry as its source capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl MosaicImage {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != width * height {
            return Err(ConversionError::EncodeError(format!(
                "mosaic is not single-channel: {} samples for {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.width + col]
    }
}
