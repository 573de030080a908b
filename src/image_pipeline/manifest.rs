//! Input set resolution
//!
//! A batch input is either a single image path or a `.txt` manifest listing
//! one path per line.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::image_pipeline::common::error::{ConversionError, Result};

pub const MANIFEST_EXTENSION: &str = "txt";

/// What to do with manifest lines that are empty once trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlankLines {
    #[default]
    Skip,
    /// Keep them as empty paths; they fail later as unreadable inputs.
    Preserve,
}

/// Ordered list of input paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<PathBuf>,
}

impl Manifest {
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: vec![path.into()],
        }
    }

    pub fn is_manifest_path(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(MANIFEST_EXTENSION)
    }

    /// Manifest file contents if `path` ends in `.txt`, otherwise `path` alone.
    pub fn resolve(path: &Path, blank_lines: BlankLines) -> Result<Self> {
        if !Self::is_manifest_path(path) {
            return Ok(Self::single(path));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConversionError::ManifestParseFailure(format!("{}: {}", path.display(), e))
        })?;
        let manifest = Self::parse(&contents, blank_lines);
        debug!(manifest = %path.display(), entries = manifest.len(), "Manifest loaded");
        Ok(manifest)
    }

    pub fn parse(contents: &str, blank_lines: BlankLines) -> Self {
        let mut skipped = 0usize;
        let entries = contents
            .lines()
            .map(str::trim)
            .filter(|line| {
                let keep = !line.is_empty() || blank_lines == BlankLines::Preserve;
                if !keep {
                    skipped += 1;
                }
                keep
            })
            .map(PathBuf::from)
            .collect();
        if skipped > 0 {
            warn!("Skipped {} blank manifest line(s)", skipped);
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Manifest {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
