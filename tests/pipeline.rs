//! End-to-end pipeline tests with a stub inference engine.
//!
//! The stub tells lines apart by how many tensor columns contain ink: short
//! lines are read as `a`, long lines as `b`.

use image::{GrayImage, Luma};
use monocr::core::errors::SimpleError;
use monocr::core::{InferenceEngine, OCRError, OcrResult, Tensor3D, Tensor4D};
use monocr::domain::Charset;
use monocr::pipeline::{MonOCR, MonOCRBuilder, MonOCRConfig};
use monocr::processors::ResizePolicy;
use ndarray::{Array3, Axis};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const LONG_LINE_COLUMNS: usize = 150;
const STEPS: usize = 16;

fn ink_columns(input: &Tensor4D) -> usize {
    let plane = input.index_axis(Axis(0), 0);
    let plane = plane.index_axis(Axis(0), 0);
    plane
        .axis_iter(Axis(1))
        .filter(|column| column.iter().any(|&v| v < 0.0))
        .count()
}

/// Emits a peak for `a` or `b`, repeated over a few timesteps, blanks elsewhere.
#[derive(Default)]
struct PeakEngine {
    fail_long_lines: bool,
    classes: Option<usize>,
    widths: Mutex<Vec<usize>>,
}

impl InferenceEngine for PeakEngine {
    fn run(&self, input: &Tensor4D) -> OcrResult<Tensor3D> {
        self.widths.lock().unwrap().push(input.shape()[3]);

        let long = ink_columns(input) >= LONG_LINE_COLUMNS;
        if long && self.fail_long_lines {
            return Err(OCRError::inference_error(
                "stub",
                "rejected input",
                SimpleError::new("long line"),
            ));
        }

        let class = if long { 2 } else { 1 };
        let mut logits = Array3::<f32>::zeros((1, STEPS, self.classes.unwrap_or(3)));
        for t in 0..STEPS {
            let best = if (2..6).contains(&t) { class } else { 0 };
            logits[[0, t, best]] = 1.0;
        }
        Ok(logits)
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

fn white_page(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255]))
}

fn paint(page: &mut GrayImage, rows: std::ops::RangeInclusive<u32>, cols: std::ops::RangeInclusive<u32>) {
    for y in rows {
        for x in cols.clone() {
            page.put_pixel(x, y, Luma([0]));
        }
    }
}

/// A short band ("a") above a long band ("b"), separated by white rows.
fn two_line_page() -> GrayImage {
    let mut page = white_page(200, 80);
    paint(&mut page, 10..=21, 10..=39);
    paint(&mut page, 50..=61, 10..=109);
    page
}

fn single_line_page(long: bool) -> GrayImage {
    let mut page = white_page(200, 40);
    let right = if long { 109 } else { 39 };
    paint(&mut page, 12..=23, 10..=right);
    page
}

fn recognizer(engine: PeakEngine, config: MonOCRConfig) -> MonOCR {
    MonOCRBuilder::from_config(config)
        .engine(Arc::new(engine))
        .charset(Charset::parse("ab").unwrap())
        .build()
        .unwrap()
}

fn save(dir: &Path, name: &str, page: &GrayImage) -> PathBuf {
    let path = dir.join(name);
    page.save(&path).unwrap();
    path
}

#[test]
fn two_bands_read_as_two_lines() {
    let ocr = recognizer(PeakEngine::default(), MonOCRConfig::default());
    let page = ocr
        .predict_image(&image::DynamicImage::ImageLuma8(two_line_page()))
        .unwrap();

    assert_eq!(page.lines.len(), 2);
    assert!(page.lines[0].bbox.bottom() <= page.lines[1].bbox.y);
    assert_eq!(page.text(), "a\nb");
    assert_eq!(page.failed_lines().count(), 0);

    let stats = ocr.stats();
    assert_eq!(stats.pages_processed, 1);
    assert_eq!(stats.lines_processed, 2);
}

#[test]
fn failing_line_does_not_abort_page() {
    let engine = PeakEngine {
        fail_long_lines: true,
        ..PeakEngine::default()
    };
    let ocr = recognizer(engine, MonOCRConfig::default());
    let page = ocr.predict_gray(&two_line_page(), None).unwrap();

    assert_eq!(page.lines.len(), 2);
    assert!(page.lines[0].is_ok());
    assert!(page.lines[1].error.as_deref().unwrap().contains("stub"));
    assert_eq!(page.text(), "a");
    assert_eq!(ocr.stats().lines_failed, 1);
}

#[test]
fn blank_page_has_no_lines() {
    let ocr = recognizer(PeakEngine::default(), MonOCRConfig::default());
    let page = ocr.predict_gray(&white_page(120, 60), None).unwrap();
    assert!(page.is_blank());
    assert_eq!(page.text(), "");
}

#[test]
fn class_count_mismatch_fails_the_page() {
    let engine = PeakEngine {
        classes: Some(5),
        ..PeakEngine::default()
    };
    let ocr = recognizer(engine, MonOCRConfig::default());
    let err = ocr.predict_gray(&two_line_page(), None).unwrap_err();
    assert!(matches!(err, OCRError::ShapeMismatch { .. }));
}

#[test]
fn variable_width_follows_aspect_ratio() {
    let config = MonOCRConfig {
        preprocessing: monocr::pipeline::PreprocessConfig {
            resize_policy: ResizePolicy::Variable,
            ..Default::default()
        },
        ..MonOCRConfig::default()
    };
    let engine = Arc::new(PeakEngine::default());
    let ocr = MonOCRBuilder::from_config(config)
        .engine(engine.clone())
        .charset(Charset::parse("ab").unwrap())
        .build()
        .unwrap();

    let page = ocr.predict_gray(&two_line_page(), None).unwrap();
    let expected: Vec<usize> = page
        .lines
        .iter()
        .map(|line| {
            let scale = 64.0 / line.bbox.height as f64;
            (line.bbox.width as f64 * scale).round() as usize
        })
        .collect();
    assert_eq!(*engine.widths.lock().unwrap(), expected);
}

#[test]
fn fixed_width_pads_every_line() {
    let engine = Arc::new(PeakEngine::default());
    let ocr = MonOCRBuilder::new()
        .engine(engine.clone())
        .charset(Charset::parse("ab").unwrap())
        .build()
        .unwrap();
    ocr.predict_gray(&two_line_page(), None).unwrap();
    assert_eq!(*engine.widths.lock().unwrap(), vec![1024, 1024]);
}

#[test]
fn batch_isolates_bad_documents_and_keeps_order() {
    let dir = tempfile::tempdir().unwrap();
    let short = save(dir.path(), "short.png", &single_line_page(false));
    let long = save(dir.path(), "long.png", &single_line_page(true));
    let broken = dir.path().join("broken.png");
    std::fs::write(&broken, b"not an image").unwrap();

    let config = MonOCRConfig {
        parallel_threshold: 0,
        ..MonOCRConfig::default()
    };
    let ocr = recognizer(PeakEngine::default(), config);
    let paths = vec![long.clone(), broken, short, dir.path().join("missing.png"), long];
    let results = ocr.predict_batch(&paths);

    assert_eq!(results.len(), 5);
    assert_eq!(results[0].as_ref().unwrap().text(), "b");
    assert!(matches!(results[1], Err(OCRError::DecodeImage { .. })));
    assert_eq!(results[2].as_ref().unwrap().text(), "a");
    assert!(matches!(results[3], Err(OCRError::DecodeImage { .. })));
    assert_eq!(results[4].as_ref().unwrap().text(), "b");
    assert_eq!(results[2].as_ref().unwrap().source.as_deref(), Some(paths[2].as_path()));

    let stats = ocr.stats();
    assert_eq!(stats.pages_processed, 3);
    assert_eq!(stats.pages_failed, 2);
}

#[test]
fn read_images_returns_text_per_input() {
    let dir = tempfile::tempdir().unwrap();
    let page = save(dir.path(), "page.png", &two_line_page());
    let ocr = recognizer(PeakEngine::default(), MonOCRConfig::default());

    let texts = ocr.read_images(&[page.clone(), page]);
    assert_eq!(texts.len(), 2);
    for text in texts {
        assert_eq!(text.unwrap(), "a\nb");
    }
}

#[test]
fn accuracy_against_ground_truth() {
    let dir = tempfile::tempdir().unwrap();
    let page = save(dir.path(), "page.png", &two_line_page());
    let ocr = recognizer(PeakEngine::default(), MonOCRConfig::default());

    let exact = ocr.read_image_with_accuracy(&page, "a\nb").unwrap();
    assert_eq!(exact.text, "a\nb");
    assert_eq!(exact.accuracy, 100.0);

    let off = ocr.read_image_with_accuracy(&page, "a\nc").unwrap();
    assert!((off.accuracy - 200.0 / 3.0).abs() < 1e-9);
}

#[test]
fn page_result_serializes_lines_and_boxes() {
    let ocr = recognizer(PeakEngine::default(), MonOCRConfig::default());
    let page = ocr.predict_gray(&two_line_page(), None).unwrap();
    let json = serde_json::to_value(&page).unwrap();

    assert_eq!(json["width"], 200);
    assert_eq!(json["lines"][1]["text"], "b");
    assert!(json["lines"][0]["bbox"]["height"].as_u64().unwrap() > 0);
}

#[cfg(unix)]
#[test]
fn pdf_pages_are_read_in_page_order() {
    use monocr::utils::PdfRasterizer;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let first = save(dir.path(), "first.png", &single_line_page(false));
    let second = save(dir.path(), "second.png", &single_line_page(true));
    let pdf = dir.path().join("doc.pdf");
    std::fs::write(&pdf, b"%PDF-1.4").unwrap();

    // Stands in for pdftoppm: `-png -r DPI INPUT PREFIX`.
    let tool = dir.path().join("fake-pdftoppm");
    std::fs::write(
        &tool,
        format!(
            "#!/bin/sh\ncp '{}' \"$5-10.png\"\ncp '{}' \"$5-9.png\"\n",
            second.display(),
            first.display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

    let ocr = MonOCRBuilder::new()
        .engine(Arc::new(PeakEngine::default()))
        .charset(Charset::parse("ab").unwrap())
        .pdf_rasterizer(PdfRasterizer::new().with_program(&tool))
        .build()
        .unwrap();

    let pages = ocr.read_pdf(&pdf).unwrap();
    let texts: Vec<String> = pages.into_iter().map(|p| p.unwrap().text()).collect();
    assert_eq!(texts, vec!["a", "b"]);
}
