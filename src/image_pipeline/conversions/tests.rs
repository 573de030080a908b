use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use image::{ImageFormat, RgbImage};

use crate::image_pipeline::capture::{CaptureReader, MosaicImage, RawCapture};
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::conversions::{
    BatchConfig, BatchPipeline, FailurePolicy, RawToMosaicPipeline,
};
use crate::image_pipeline::manifest::{BlankLines, Manifest};
use crate::image_pipeline::mosaic::{MosaicCompression, MosaicConfig, MosaicWriter, OutputEncoding};

struct MockReader {
    should_fail: bool,
    mock_data: Option<RawCapture>,
}

impl CaptureReader for MockReader {
    fn read_capture(&self, _data: &[u8]) -> Result<RawCapture> {
        if self.should_fail {
            return Err(ConversionError::UnreadableInput("Mock decode error".to_string()));
        }
        Ok(self.mock_data.clone().unwrap_or_else(|| RawCapture::zeroed(8, 8)))
    }
}

struct MockWriter {
    should_fail: bool,
    written_data: Arc<Mutex<Vec<MosaicImage>>>,
}

impl MosaicWriter for MockWriter {
    fn write_mosaic(&self, image: &MosaicImage, _output: &mut dyn Write, _config: &MosaicConfig) -> Result<()> {
        if self.should_fail {
            return Err(ConversionError::EncodeError("Mock encode error".to_string()));
        }
        self.written_data.lock().unwrap().push(image.clone());
        Ok(())
    }
}

fn mock_pipeline(
    reader_fails: bool,
    writer_fails: bool,
    capture: Option<RawCapture>,
) -> (RawToMosaicPipeline<MockReader, MockWriter>, Arc<Mutex<Vec<MosaicImage>>>) {
    let written = Arc::new(Mutex::new(Vec::new()));
    let pipeline = RawToMosaicPipeline::with_custom(
        MockReader { should_fail: reader_fails, mock_data: capture },
        MockWriter { should_fail: writer_fails, written_data: written.clone() },
        MosaicConfig::default(),
    );
    (pipeline, written)
}

/// PNG-encoded RGB capture whose channel 2 ramps with the pixel index.
fn write_rgb_capture(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7) as u8, (y * 11) as u8, (x + y * width) as u8])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    std::fs::write(path, bytes).unwrap();
}

fn decode_gray(path: &Path) -> (u32, u32, Vec<u8>) {
    let img = image::ImageReader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(img.color().channel_count(), 1);
    let gray = img.into_luma8();
    (gray.width(), gray.height(), gray.into_raw())
}

#[test]
fn test_config_builder() {
    let config = MosaicConfig::builder()
        .compression(MosaicCompression::DeflateBest)
        .predictor(Some(2))
        .encoding(OutputEncoding::Png)
        .build();

    assert_eq!(config.compression, MosaicCompression::DeflateBest);
    assert_eq!(config.predictor, Some(2));
    assert_eq!(config.encoding, OutputEncoding::Png);
}

#[test]
fn test_batch_config_builder_clamps_workers() {
    let config = BatchConfig::builder()
        .workers(0)
        .failure_policy(FailurePolicy::SkipAndReport)
        .blank_lines(BlankLines::Preserve)
        .build();

    assert_eq!(config.workers, 1);
    assert_eq!(config.failure_policy, FailurePolicy::SkipAndReport);
    assert_eq!(config.blank_lines, BlankLines::Preserve);
    assert!(!config.show_progress);
}

#[test]
fn test_successful_conversion() {
    let (pipeline, written) = mock_pipeline(false, false, None);

    let mut output = Cursor::new(Vec::new());
    pipeline.convert(b"fake capture", &mut output).unwrap();

    let written = written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!((written[0].width(), written[0].height()), (8, 8));
}

#[test]
fn test_reader_failure() {
    let (pipeline, written) = mock_pipeline(true, false, None);

    let result = pipeline.convert(b"fake capture", &mut Cursor::new(Vec::new()));

    assert!(matches!(result.unwrap_err(), ConversionError::UnreadableInput(_)));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_writer_failure() {
    let (pipeline, _) = mock_pipeline(false, true, None);

    let result = pipeline.convert(b"fake capture", &mut Cursor::new(Vec::new()));

    assert!(matches!(result.unwrap_err(), ConversionError::EncodeError(_)));
}

#[test]
fn test_odd_capture_never_reaches_writer() {
    let (pipeline, written) = mock_pipeline(false, false, Some(RawCapture::zeroed(5, 4)));

    let result = pipeline.convert(b"fake capture", &mut Cursor::new(Vec::new()));

    assert!(matches!(result.unwrap_err(), ConversionError::InvalidDimensions(5, 4)));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_missing_input_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = RawToMosaicPipeline::new(MosaicConfig::default());

    let err = pipeline
        .convert_file(dir.path().join("nope.tiff"), dir.path().join("out.tiff"))
        .unwrap_err();

    assert!(matches!(err, ConversionError::UnreadableInput(_)));
    assert!(!dir.path().join("out.tiff").exists());
}

#[test]
fn test_output_path_keeps_base_name() {
    let out = BatchPipeline::<MockReader, MockWriter>::output_path_for(
        Path::new("/captures/day1/DSC01234.tiff"),
        Path::new("mono"),
    )
    .unwrap();
    assert_eq!(out, PathBuf::from("mono/DSC01234.tiff"));
}

#[test]
fn test_empty_path_has_no_output_name() {
    let err = BatchPipeline::<MockReader, MockWriter>::output_path_for(Path::new(""), Path::new("mono"))
        .unwrap_err();
    assert!(matches!(err, ConversionError::UnreadableInput(_)));
}

#[test]
fn test_manifest_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.raw");
    let b = dir.path().join("b.raw");
    write_rgb_capture(&a, 4, 4);
    write_rgb_capture(&b, 6, 2);

    let list = dir.path().join("list.txt");
    std::fs::write(&list, format!("{}\n{}\n", a.display(), b.display())).unwrap();
    let out = dir.path().join("out");

    let report = BatchPipeline::new(MosaicConfig::default(), BatchConfig::default())
        .run(&list, &out)
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.processed, vec![out.join("a.raw"), out.join("b.raw")]);

    let mut names: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.raw", "b.raw"]);

    let (w, h, _) = decode_gray(&out.join("a.raw"));
    assert_eq!((w, h), (4, 4));
    let (w, h, _) = decode_gray(&out.join("b.raw"));
    assert_eq!((w, h), (6, 2));
}

#[test]
fn test_single_png_keeps_png_container_and_blue_max() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("shot.png");
    write_rgb_capture(&input, 4, 4);
    let out = dir.path().join("mono");

    BatchPipeline::new(MosaicConfig::default(), BatchConfig::default())
        .run(&input, &out)
        .unwrap();

    let bytes = std::fs::read(out.join("shot.png")).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);

    // channel 2 is x + 4y: B(1,1) = 5 beats B'(0,0) = 0
    let (_, _, data) = decode_gray(&out.join("shot.png"));
    assert_eq!(data[4 + 1], 5);
    // red site (0, 2) is x * 7
    assert_eq!(data[2], 14);
}

#[test]
fn test_existing_output_dir_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.tiff");
    write_rgb_capture(&input, 2, 2);
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    std::fs::write(out.join("unrelated.txt"), "keep").unwrap();

    let pipeline = BatchPipeline::new(MosaicConfig::default(), BatchConfig::default());
    pipeline.run(&input, &out).unwrap();
    pipeline.run(&input, &out).unwrap();

    assert!(out.join("a.tiff").exists());
    assert!(out.join("unrelated.txt").exists());
}

#[test]
fn test_fail_fast_names_offending_path() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.tiff");
    let missing = dir.path().join("missing.tiff");
    let later = dir.path().join("later.tiff");
    write_rgb_capture(&good, 2, 2);
    write_rgb_capture(&later, 2, 2);
    let manifest = Manifest::parse(
        &format!("{}\n{}\n{}", good.display(), missing.display(), later.display()),
        BlankLines::Skip,
    );
    let out = dir.path().join("out");

    let err = BatchPipeline::new(MosaicConfig::default(), BatchConfig::default())
        .run_manifest(&manifest, &out)
        .unwrap_err();

    match &err {
        ConversionError::Item { path, .. } => assert_eq!(path, &missing),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(err.root(), ConversionError::UnreadableInput(_)));
    assert!(err.to_string().contains("missing.tiff"));
    assert!(out.join("good.tiff").exists());
    assert!(!out.join("later.tiff").exists());
}

#[test]
fn test_undecodable_inputs_are_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let garbage = dir.path().join("garbage.tiff");
    std::fs::write(&garbage, "this is a text file").unwrap();
    let gray = dir.path().join("gray.png");
    image::GrayImage::from_pixel(4, 4, image::Luma([9])).save(&gray).unwrap();
    let pipeline = BatchPipeline::new(MosaicConfig::default(), BatchConfig::default());

    for input in [&garbage, &gray] {
        let err = pipeline.run(input, &dir.path().join("out")).unwrap_err();

        assert!(
            matches!(err.root(), ConversionError::UnreadableInput(_)),
            "{}: {err:?}",
            input.display()
        );
        assert!(err.to_string().contains(input.file_name().unwrap().to_str().unwrap()));
    }
}

#[test]
fn test_skip_and_report_continues() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.tiff");
    let odd = dir.path().join("odd.tiff");
    write_rgb_capture(&good, 4, 2);
    write_rgb_capture(&odd, 3, 2);
    let manifest = Manifest::parse(&format!("{}\n{}", odd.display(), good.display()), BlankLines::Skip);

    let config = BatchConfig::builder()
        .failure_policy(FailurePolicy::SkipAndReport)
        .build();
    let report = BatchPipeline::new(MosaicConfig::default(), config)
        .run_manifest(&manifest, &dir.path().join("out"))
        .unwrap();

    assert_eq!(report.processed.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].input, odd);
    assert!(matches!(report.failures[0].error.root(), ConversionError::InvalidDimensions(3, 2)));
}

#[test]
fn test_preserved_blank_line_fails_as_item() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = Manifest::parse("\n", BlankLines::Preserve);

    let err = BatchPipeline::new(MosaicConfig::default(), BatchConfig::default())
        .run_manifest(&manifest, &dir.path().join("out"))
        .unwrap_err();

    assert!(matches!(err.root(), ConversionError::UnreadableInput(_)));
}

#[test]
fn test_parallel_workers_convert_everything() {
    let dir = tempfile::tempdir().unwrap();
    let mut lines = Vec::new();
    for i in 0..12 {
        let path = dir.path().join(format!("frame{i:02}.tiff"));
        write_rgb_capture(&path, 4, 4);
        lines.push(path.display().to_string());
    }
    let manifest = Manifest::parse(&lines.join("\n"), BlankLines::Skip);
    let out = dir.path().join("out");

    let config = BatchConfig::builder().workers(4).build();
    let report = BatchPipeline::new(MosaicConfig::default(), config)
        .run_manifest(&manifest, &out)
        .unwrap();

    assert_eq!(report.processed.len(), 12);
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 12);
}

#[test]
fn test_cancelled_batch_reports_cancellation() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.tiff");
    write_rgb_capture(&input, 2, 2);

    let flag = Arc::new(AtomicBool::new(true));
    let err = BatchPipeline::new(MosaicConfig::default(), BatchConfig::default())
        .with_cancel_flag(flag)
        .run(&input, &dir.path().join("out"))
        .unwrap_err();

    assert!(matches!(err, ConversionError::Cancelled));
    assert!(!dir.path().join("out").join("a.tiff").exists());
}

#[test]
fn test_tiff_output_round_trips_through_decoder() {
    let capture = RawCapture::new(2, 2, vec![
        10, 0, 0,   0, 20, 0,
        0, 30, 0,   0, 0, 40,
    ])
    .unwrap();
    let pipeline = RawToMosaicPipeline::with_custom(
        MockReader { should_fail: false, mock_data: Some(capture) },
        crate::image_pipeline::mosaic::StandardTiffWriter,
        MosaicConfig::builder().compression(MosaicCompression::Lzw).build(),
    );

    let mut output = Cursor::new(Vec::new());
    pipeline.convert(b"fake capture", &mut output).unwrap();

    let mut decoder = tiff::decoder::Decoder::new(Cursor::new(output.into_inner())).unwrap();
    assert_eq!(decoder.dimensions().unwrap(), (2, 2));
    match decoder.read_image().unwrap() {
        tiff::decoder::DecodingResult::U8(data) => assert_eq!(data, vec![10, 20, 30, 40]),
        _ => panic!("expected 8-bit samples"),
    }
}
