use std::path::{Path, PathBuf};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::external::command::ToolCommand;

/// Raw decoder used to dump undemosaiced 16-bit TIFFs next to the sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDecoder {
    Dcraw,
    /// `dcraw_emu` from LibRaw
    LibRaw,
}

/// Decoder choice and channel multipliers, built once and shared by every job.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    decoder: RawDecoder,
    program: Option<PathBuf>,
    no_auto_bright: bool,
    multipliers: Option<[f32; 4]>,
}

impl DecoderConfig {
    /// `multipliers` are R G B G. LibRaw defaults them to unity; dcraw uses the
    /// camera's own when none are given.
    pub fn new(decoder: RawDecoder, no_auto_bright: bool, multipliers: Option<[f32; 4]>) -> Result<Self> {
        if decoder == RawDecoder::LibRaw && no_auto_bright {
            return Err(ConversionError::InvalidConfig(
                "disabling auto-brightening is only supported with dcraw".into(),
            ));
        }
        let multipliers = match (decoder, multipliers) {
            (RawDecoder::LibRaw, None) => Some([1.0; 4]),
            (_, m) => m,
        };
        Ok(Self {
            decoder,
            program: None,
            no_auto_bright,
            multipliers,
        })
    }

    /// Runs a specific executable instead of the one found on `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn program(&self) -> &Path {
        match (&self.program, self.decoder) {
            (Some(program), _) => program,
            (None, RawDecoder::Dcraw) => Path::new("dcraw"),
            (None, RawDecoder::LibRaw) => Path::new("dcraw_emu"),
        }
    }

    pub fn decoder(&self) -> RawDecoder {
        self.decoder
    }

    pub fn multipliers(&self) -> Option<[f32; 4]> {
        self.multipliers
    }

    pub fn no_auto_bright(&self) -> bool {
        self.no_auto_bright
    }

    fn multiplier_args(&self) -> Vec<String> {
        match self.multipliers {
            Some(m) => std::iter::once("-r".to_string())
                .chain(m.iter().map(|v| format!("{:.3}", v)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Command that decodes `image_path` into `<image_path stem>.tiff`.
    pub fn build_command(&self, image_path: &Path) -> ToolCommand {
        match self.decoder {
            RawDecoder::Dcraw => {
                let mut cmd = ToolCommand::new(self.program());
                if self.no_auto_bright {
                    cmd = cmd.arg("-W");
                }
                cmd.args(self.multiplier_args())
                    .args(["-d", "-6", "-T"])
                    .arg(image_path)
            }
            RawDecoder::LibRaw => ToolCommand::new(self.program())
                .args(self.multiplier_args())
                .args(["-disinterp", "-6", "-T", "-o", "0"])
                .arg(image_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn args(cmd: &ToolCommand) -> Vec<OsString> {
        cmd.args.clone()
    }

    #[test]
    fn test_dcraw_defaults() {
        let config = DecoderConfig::new(RawDecoder::Dcraw, false, None).unwrap();
        let cmd = config.build_command(Path::new("/shots/DSC0001.ARW"));

        assert_eq!(cmd.program, Path::new("dcraw"));
        assert_eq!(args(&cmd), ["-d", "-6", "-T", "/shots/DSC0001.ARW"].map(OsString::from));
    }

    #[test]
    fn test_dcraw_with_flags() {
        let config = DecoderConfig::new(RawDecoder::Dcraw, true, Some([2.0, 1.0, 1.5, 1.0])).unwrap();
        let cmd = config.build_command(Path::new("a b's.ARW"));

        assert_eq!(
            args(&cmd),
            ["-W", "-r", "2.000", "1.000", "1.500", "1.000", "-d", "-6", "-T", "a b's.ARW"]
                .map(OsString::from)
        );
    }

    #[test]
    fn test_libraw_gets_unity_multipliers() {
        let config = DecoderConfig::new(RawDecoder::LibRaw, false, None).unwrap();
        assert_eq!(config.multipliers(), Some([1.0; 4]));

        let cmd = config.build_command(Path::new("x.ARW"));
        assert_eq!(cmd.program, Path::new("dcraw_emu"));
        assert_eq!(
            args(&cmd),
            ["-r", "1.000", "1.000", "1.000", "1.000", "-disinterp", "-6", "-T", "-o", "0", "x.ARW"]
                .map(OsString::from)
        );
    }

    #[test]
    fn test_program_override() {
        let config = DecoderConfig::new(RawDecoder::Dcraw, false, None)
            .unwrap()
            .with_program("/opt/dcraw/bin/dcraw");
        let cmd = config.build_command(Path::new("x.ARW"));
        assert_eq!(cmd.program, Path::new("/opt/dcraw/bin/dcraw"));
    }

    #[test]
    fn test_libraw_rejects_no_auto_bright() {
        let err = DecoderConfig::new(RawDecoder::LibRaw, true, None).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidConfig(_)));
    }
}
