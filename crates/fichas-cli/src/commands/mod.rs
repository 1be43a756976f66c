//! CLI subcommands and shared helpers.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use fichas_core::models::config::FichasConfig;
use fichas_core::{SidecarTranscriber, Transcriber};

/// Where transcripts come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Engine {
    /// Run the ONNX OCR models on each image
    Onnx,
    /// Read a pre-made transcript next to each image
    Sidecar,
}

/// Load the config file if one was given, otherwise use defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FichasConfig> {
    let config = if let Some(path) = config_path {
        FichasConfig::from_file(Path::new(path))?
    } else {
        FichasConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Build the transcriber selected on the command line.
pub fn create_transcriber(
    engine: Engine,
    config: &FichasConfig,
    model_dir: Option<&PathBuf>,
) -> anyhow::Result<Box<dyn Transcriber>> {
    match engine {
        Engine::Sidecar => {
            debug!(
                "Using sidecar transcripts with extension .{}",
                config.ocr.sidecar_extension
            );
            Ok(Box::new(SidecarTranscriber::new(
                config.ocr.sidecar_extension.clone(),
            )))
        }
        Engine::Onnx => create_onnx(config, model_dir),
    }
}

#[cfg(feature = "native")]
fn create_onnx(
    config: &FichasConfig,
    model_dir: Option<&PathBuf>,
) -> anyhow::Result<Box<dyn Transcriber>> {
    use fichas_core::OnnxTranscriber;

    let model_dir = model_dir
        .cloned()
        .unwrap_or_else(|| config.ocr.model_dir.clone());
    debug!(
        "Using OCR models from {} (detection: {})",
        model_dir.display(),
        model_dir.join(&config.ocr.detection_model).display()
    );

    let transcriber = OnnxTranscriber::from_dir(&model_dir, &config.ocr).map_err(|e| {
        anyhow::anyhow!(
            "{}\n\nPlace {}, {} and {} in {} or pass --model-dir.",
            e,
            config.ocr.detection_model,
            config.ocr.recognition_model,
            config.ocr.dictionary,
            model_dir.display()
        )
    })?;
    Ok(Box::new(transcriber))
}

#[cfg(not(feature = "native"))]
fn create_onnx(
    _config: &FichasConfig,
    _model_dir: Option<&PathBuf>,
) -> anyhow::Result<Box<dyn Transcriber>> {
    anyhow::bail!("This build has no OCR engine; use --engine sidecar")
}
