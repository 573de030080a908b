use std::path::Path;

use tracing::{info, instrument};
use walkdir::WalkDir;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::dataset::{CLEAN_DIR, NOISY_DIR};

/// Which frame of each pair was shot first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairOrder {
    #[default]
    NoisyFirst,
    CleanFirst,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PairReport {
    pub clean: usize,
    pub noisy: usize,
}

/// Camera frame index, characters 3..8 of names like `DSC01234.ARW`.
fn frame_index(name: &str) -> Option<u32> {
    name.get(3..8)?.parse().ok()
}

/// Moves the captures directly inside `dir` into `dir/Clean` and `dir/Noisy`,
/// alternating in name order, as `Cleanb<batch>_<n>.ARW` / `Noisyb<batch>_<n>.ARW`.
///
/// Stops at the first file without a camera frame index; files before it
/// stay moved.
#[instrument]
pub fn organize_pairs(dir: &Path, batch: u32, order: PairOrder) -> Result<PairReport> {
    let clean_dir = dir.join(CLEAN_DIR);
    let noisy_dir = dir.join(NOISY_DIR);
    for sub in [&clean_dir, &noisy_dir] {
        std::fs::create_dir_all(sub)
            .map_err(|e| ConversionError::OutputWriteFailure(format!("{}: {}", sub.display(), e)))?;
    }

    let mut captures = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ConversionError::UnreadableInput(e.to_string()))?;
        if entry.file_type().is_file() {
            captures.push(entry.into_path());
        }
    }

    let clean_parity = match order {
        PairOrder::NoisyFirst => 1,
        PairOrder::CleanFirst => 0,
    };

    let mut report = PairReport::default();
    for capture in captures {
        let name = capture
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if frame_index(&name).is_none() {
            return Err(ConversionError::at(
                &capture,
                ConversionError::UnsupportedFormat("no camera frame index in file name".into()),
            ));
        }

        let target = if (report.clean + report.noisy) % 2 == clean_parity {
            let target = clean_dir.join(format!("Cleanb{}_{:05}.ARW", batch, report.clean));
            report.clean += 1;
            target
        } else {
            let target = noisy_dir.join(format!("Noisyb{}_{:05}.ARW", batch, report.noisy));
            report.noisy += 1;
            target
        };

        std::fs::rename(&capture, &target).map_err(|e| {
            ConversionError::at(
                &capture,
                ConversionError::OutputWriteFailure(format!("{}: {}", target.display(), e)),
            )
        })?;
    }

    info!(clean = report.clean, noisy = report.noisy, "Pairs organized");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shoot(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), name.as_bytes()).unwrap();
        }
    }

    #[test]
    fn test_noisy_first_alternation() {
        let dir = tempfile::tempdir().unwrap();
        shoot(dir.path(), &["DSC00001.ARW", "DSC00002.ARW", "DSC00003.ARW", "DSC00004.ARW"]);

        let report = organize_pairs(dir.path(), 18, PairOrder::NoisyFirst).unwrap();

        assert_eq!(report, PairReport { clean: 2, noisy: 2 });
        let noisy0 = std::fs::read(dir.path().join("Noisy/Noisyb18_00000.ARW")).unwrap();
        let clean0 = std::fs::read(dir.path().join("Clean/Cleanb18_00000.ARW")).unwrap();
        assert_eq!(noisy0, b"DSC00001.ARW");
        assert_eq!(clean0, b"DSC00002.ARW");
        assert!(dir.path().join("Clean/Cleanb18_00001.ARW").exists());
        assert!(dir.path().join("Noisy/Noisyb18_00001.ARW").exists());
    }

    #[test]
    fn test_clean_first_alternation() {
        let dir = tempfile::tempdir().unwrap();
        shoot(dir.path(), &["DSC00010.ARW", "DSC00011.ARW"]);

        organize_pairs(dir.path(), 1, PairOrder::CleanFirst).unwrap();

        let clean0 = std::fs::read(dir.path().join("Clean/Cleanb1_00000.ARW")).unwrap();
        assert_eq!(clean0, b"DSC00010.ARW");
    }

    #[test]
    fn test_unindexed_file_stops_with_its_name() {
        let dir = tempfile::tempdir().unwrap();
        shoot(dir.path(), &["DSC00001.ARW", "readme"]);

        let err = organize_pairs(dir.path(), 2, PairOrder::NoisyFirst).unwrap_err();

        assert!(err.to_string().contains("readme"));
        assert!(dir.path().join("Noisy/Noisyb2_00000.ARW").exists());
        assert!(dir.path().join("readme").exists());
    }

    #[test]
    fn test_frame_index() {
        assert_eq!(frame_index("DSC01234.ARW"), Some(1234));
        assert_eq!(frame_index("IMG_x.ARW"), None);
        assert_eq!(frame_index("ab"), None);
    }
}
