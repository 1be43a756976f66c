//! Transcription providers turning images into raw text.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "native")]
pub use pure_engine::OnnxTranscriber;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::TranscriptionError;

/// Markers left behind when a vision model echoes the conversation.
const ECHO_MARKERS: [&str; 2] = ["User:", "Question:"];

/// Anything that can turn an image into multi-line text.
pub trait Transcriber {
    /// Transcribe the image at `image`.
    fn transcribe(&self, image: &Path) -> Result<String, TranscriptionError>;
}

impl<F> Transcriber for F
where
    F: Fn(&Path) -> Result<String, TranscriptionError>,
{
    fn transcribe(&self, image: &Path) -> Result<String, TranscriptionError> {
        self(image)
    }
}

/// Cut a transcript at the first echoed prompt marker.
pub fn clean_transcript(text: &str) -> String {
    let mut text = text;
    for marker in ECHO_MARKERS {
        if let Some((head, _)) = text.split_once(marker) {
            text = head;
        }
    }
    text.trim().to_string()
}

/// Reads a pre-made transcript stored next to each image.
///
/// `cards/1.jpeg` is transcribed by reading `cards/1.txt`.
#[derive(Debug, Clone)]
pub struct SidecarTranscriber {
    extension: String,
}

impl SidecarTranscriber {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Path of the transcript belonging to `image`.
    pub fn sidecar_path(&self, image: &Path) -> PathBuf {
        image.with_extension(&self.extension)
    }
}

impl Default for SidecarTranscriber {
    fn default() -> Self {
        Self::new("txt")
    }
}

impl Transcriber for SidecarTranscriber {
    fn transcribe(&self, image: &Path) -> Result<String, TranscriptionError> {
        let path = self.sidecar_path(image);
        if !path.is_file() {
            return Err(TranscriptionError::MissingTranscript(path));
        }
        debug!("Reading transcript from {}", path.display());
        let text = std::fs::read_to_string(&path)?;
        Ok(clean_transcript(&text))
    }
}
