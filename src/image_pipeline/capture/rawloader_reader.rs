//! Camera raw reader built on the rawloader library.
//!
//! Produces the libraw-style 3-channel layout the remapper consumes: every
//! photosite keeps its own value in the plane of its CFA colour and the other
//! two planes stay at zero.

use std::io::Cursor;

use rawloader::{RawImageData as RawloaderImageData, CFA};
use tracing::debug;

use crate::image_pipeline::capture::reader::CaptureReader;
use crate::image_pipeline::capture::types::{Channel, RawCapture};
use crate::image_pipeline::common::error::{ConversionError, Result};

/// RAW image reader that uses the rawloader library for decoding.
///
/// Supports any Bayer format rawloader can decode (ARW, CR2, NEF, DNG, ...).
/// Samples are normalised to 8 bits between the sensor black and white levels
/// and the frame is shifted so a red photosite sits at (0, 0).
pub struct RawLoaderReader;

/// rawloader reports CFA colours as 0 = R, 1 = G, 2 = B, 3 = second G / E.
const CFA_RED: usize = 0;

impl RawLoaderReader {
    fn red_origin(cfa: &CFA) -> Option<(usize, usize)> {
        (0..2)
            .flat_map(|row| (0..2).map(move |col| (row, col)))
            .find(|&(row, col)| cfa.color_at(row, col) == CFA_RED)
    }

    fn channel_for(color: usize) -> Channel {
        match color {
            0 => Channel::Red,
            2 => Channel::Blue,
            _ => Channel::Green,
        }
    }

    /// Maps sensor values onto 0..=255 between the black and white levels.
    fn normalize(data: &RawloaderImageData, black: u16, white: u16) -> Vec<u8> {
        let black = black as f32;
        let range = (white as f32 - black).max(1.0);
        match data {
            RawloaderImageData::Integer(values) => values
                .iter()
                .map(|&v| (((v as f32 - black).max(0.0) / range) * 255.0).min(255.0) as u8)
                .collect(),
            RawloaderImageData::Float(values) => values
                .iter()
                .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
                .collect(),
        }
    }

    /// Shifts the single-channel CFA frame so a red site lands on (0, 0),
    /// crops it to even dimensions and spreads each sample into its colour
    /// plane.
    fn scatter(cfa: &CFA, src_width: usize, src_height: usize, samples: &[u8]) -> Result<RawCapture> {
        if samples.len() != src_width * src_height {
            return Err(ConversionError::UnreadableInput(format!(
                "raw frame holds {} samples, expected {}x{}",
                samples.len(),
                src_width,
                src_height
            )));
        }

        let (dy, dx) = Self::red_origin(cfa).ok_or_else(|| {
            ConversionError::UnreadableInput("CFA has no red site in its first 2x2 block".into())
        })?;

        let width = src_width.saturating_sub(dx) & !1;
        let height = src_height.saturating_sub(dy) & !1;
        debug!(
            "Raw frame {}x{}, red origin at ({}, {}), cropped to {}x{}",
            src_width, src_height, dy, dx, width, height
        );

        let mut planes = vec![0u8; width * height * RawCapture::CHANNELS];
        for row in 0..height {
            for col in 0..width {
                let (sy, sx) = (row + dy, col + dx);
                let channel = Self::channel_for(cfa.color_at(sy, sx));
                planes[(row * width + col) * RawCapture::CHANNELS + channel.index()] =
                    samples[sy * src_width + sx];
            }
        }

        RawCapture::new(width, height, planes)
    }
}

impl CaptureReader for RawLoaderReader {
    /// Decodes a camera raw file into a 3-channel capture.
    ///
    /// # Arguments
    ///
    /// * `data` - Raw bytes of the camera raw file
    ///
    /// # Returns
    ///
    /// * `Ok(RawCapture)` - Even-sized capture with R at (0, 0)
    /// * `Err(ConversionError::UnreadableInput)` - Not decodable, not Bayer,
    ///   or no red site in the CFA
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mosaic_prep_rs::image_pipeline::{CaptureReader, RawLoaderReader};
    ///
    /// let raw_bytes = std::fs::read("DSC01234.ARW").unwrap();
    /// let capture = RawLoaderReader.read_capture(&raw_bytes).unwrap();
    /// assert_eq!(capture.width() % 2, 0);
    /// ```
    fn read_capture(&self, data: &[u8]) -> Result<RawCapture> {
        debug!("Decoding RAW image, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| ConversionError::UnreadableInput(format!("cannot decode camera raw: {}", e)))?;

        if decoded.cpp != 1 {
            return Err(ConversionError::UnreadableInput(format!(
                "expected single-sample Bayer data, got {} components per pixel",
                decoded.cpp
            )));
        }

        let normalized = Self::normalize(&decoded.data, decoded.blacklevels[0], decoded.whitelevels[0]);
        Self::scatter(&decoded.cfa, decoded.width, decoded.height, &normalized)
    }
}
