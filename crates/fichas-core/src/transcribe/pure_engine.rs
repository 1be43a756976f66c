//! OCR transcriber backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::path::Path;
use std::time::Instant;

use image::GenericImageView;
use tracing::{debug, info};

use crate::error::TranscriptionError;
use crate::models::config::OcrConfig;

use super::{clean_transcript, ImagePreprocessor, Transcriber};

/// Vertical band, in pixels, treated as one text row.
const ROW_HEIGHT: f64 = 20.0;

/// Transcriber running detection and recognition models on each image.
pub struct OnnxTranscriber {
    engine: pure_onnx_ocr::engine::OcrEngine,
    preprocessor: ImagePreprocessor,
    keep_unk: bool,
}

/// One recognized region, reduced to what reading order needs.
struct Region {
    left: f64,
    top: f64,
    text: String,
}

impl OnnxTranscriber {
    /// Create a transcriber from the model files named in `config`.
    pub fn from_config(config: &OcrConfig) -> Result<Self, TranscriptionError> {
        Self::from_dir(&config.model_dir, config)
    }

    /// Create a transcriber from model files in `model_dir`.
    pub fn from_dir(model_dir: &Path, config: &OcrConfig) -> Result<Self, TranscriptionError> {
        let det_path = model_dir.join(&config.detection_model);
        let rec_path = model_dir.join(&config.recognition_model);
        let dict_path = model_dir.join(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.is_file() {
                return Err(TranscriptionError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| TranscriptionError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine,
            preprocessor: ImagePreprocessor::new()
                .with_max_size(config.max_image_size)
                .with_rotation(config.rotate_degrees),
            keep_unk: config.keep_unk,
        })
    }
}

impl Transcriber for OnnxTranscriber {
    fn transcribe(&self, image_path: &Path) -> Result<String, TranscriptionError> {
        let start = Instant::now();

        let image = image::open(image_path).map_err(|e| TranscriptionError::ImageLoad {
            path: image_path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let image = self.preprocessor.prepare(&image);
        let (width, height) = image.dimensions();

        debug!("Recognizing {} ({}x{})", image_path.display(), width, height);

        let results = self
            .engine
            .run_from_image(&image)
            .map_err(|e| TranscriptionError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut regions: Vec<Region> = results
            .iter()
            .map(|r| {
                let (left, top) = top_left(&r.bounding_box);
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Region { left, top, text }
            })
            .collect();

        sort_reading_order(&mut regions);

        let text = regions
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        info!(
            "OCR complete: {} text regions in {}ms",
            regions.len(),
            start.elapsed().as_millis()
        );

        Ok(clean_transcript(&text))
    }
}

/// Smallest x and y over the polygon's exterior points.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}

/// Top-to-bottom by row band, then left-to-right.
fn sort_reading_order(regions: &mut [Region]) {
    regions.sort_by(|a, b| {
        let row_a = (a.top / ROW_HEIGHT) as i64;
        let row_b = (b.top / ROW_HEIGHT) as i64;
        row_a
            .cmp(&row_b)
            .then_with(|| a.left.partial_cmp(&b.left).unwrap_or(std::cmp::Ordering::Equal))
    });
}
