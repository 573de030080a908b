use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Unreadable input: {0}")]
    UnreadableInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image dimensions: width={0}, height={1} (both must be even and non-zero)")]
    InvalidDimensions(usize, usize),

    #[error("Failed to encode mosaic: {0}")]
    EncodeError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteFailure(String),

    #[error("Failed to read manifest: {0}")]
    ManifestParseFailure(String),

    #[error("External tool failed: {0}")]
    ExternalToolFailure(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dataset sanity check failed: {0}")]
    DatasetMismatch(String),

    #[error("Batch cancelled")]
    Cancelled,

    #[error("{}: {source}", .path.display())]
    Item {
        path: PathBuf,
        #[source]
        source: Box<ConversionError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConversionError {
    /// Attaches the offending input path to an error.
    pub fn at(path: impl AsRef<Path>, source: ConversionError) -> Self {
        ConversionError::Item {
            path: path.as_ref().to_path_buf(),
            source: Box::new(source),
        }
    }

    /// Strips any path wrapper.
    pub fn root(&self) -> &ConversionError {
        match self {
            ConversionError::Item { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
