//! Mosaic output configuration types

use std::path::Path;

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Container format of written mosaics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    /// PNG for `.png` outputs, TIFF for everything else
    Auto,
    Tiff,
    Png,
}

impl OutputEncoding {
    /// Concrete encoding for an output path. Never returns `Auto`.
    pub fn resolve(self, path: &Path) -> OutputEncoding {
        match self {
            OutputEncoding::Auto => {
                let is_png = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("png"));
                if is_png { OutputEncoding::Png } else { OutputEncoding::Tiff }
            }
            other => other,
        }
    }
}

/// Configuration for writing mosaics
#[derive(Debug, Clone)]
pub struct MosaicConfig {
    /// Compression method for TIFF output
    pub compression: MosaicCompression,
    /// Predictor value for TIFF compression (2 = horizontal differencing)
    pub predictor: Option<u16>,
    /// How the output container is chosen
    pub encoding: OutputEncoding,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            compression: MosaicCompression::None,
            predictor: None,
            encoding: OutputEncoding::Auto,
        }
    }
}

impl MosaicConfig {
    pub fn builder() -> MosaicConfigBuilder {
        MosaicConfigBuilder::default()
    }
}

/// Builder for MosaicConfig
#[derive(Default)]
pub struct MosaicConfigBuilder {
    compression: Option<MosaicCompression>,
    predictor: Option<Option<u16>>,
    encoding: Option<OutputEncoding>,
}

impl MosaicConfigBuilder {
    pub fn compression(mut self, compression: MosaicCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn build(self) -> MosaicConfig {
        let default = MosaicConfig::default();
        MosaicConfig {
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
            encoding: self.encoding.unwrap_or(default.encoding),
        }
    }
}
