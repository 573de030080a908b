use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Role of a frame in the dataset; selects the output name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Clean,
    Noisy,
    Test,
}

impl FrameKind {
    pub fn prefix(self) -> char {
        match self {
            FrameKind::Clean => 'c',
            FrameKind::Noisy => 'n',
            FrameKind::Test => 't',
        }
    }

    /// `c000042.tiff` and friends.
    pub fn file_name(self, index: usize) -> String {
        format!("{}{:06}.tiff", self.prefix(), index)
    }
}

/// Files anywhere under `dir` whose name matches `pattern`, sorted by path.
pub fn list_files(dir: &Path, pattern: Option<&Regex>) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(ConversionError::UnreadableInput(format!(
            "{} does not exist",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ConversionError::UnreadableInput(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = pattern.is_none_or(|re| re.is_match(&entry.file_name().to_string_lossy()));
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "Listed files");
    Ok(files)
}

/// Renames every file into `dst` under sequential [`FrameKind::file_name`]s,
/// numbering on from the files already there. Returns the new paths.
pub fn move_to_destination(files: &[PathBuf], dst: &Path, kind: FrameKind) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dst)
        .map_err(|e| ConversionError::OutputWriteFailure(format!("{}: {}", dst.display(), e)))?;

    let existing = std::fs::read_dir(dst)
        .map_err(|e| ConversionError::OutputWriteFailure(format!("{}: {}", dst.display(), e)))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .count();

    let mut moved = Vec::with_capacity(files.len());
    for (offset, file) in files.iter().enumerate() {
        let target = dst.join(kind.file_name(existing + offset));
        std::fs::rename(file, &target).map_err(|e| {
            ConversionError::at(
                file,
                ConversionError::OutputWriteFailure(format!("{}: {}", target.display(), e)),
            )
        })?;
        moved.push(target);
    }
    debug!(dst = %dst.display(), count = moved.len(), "Moved files");
    Ok(moved)
}
