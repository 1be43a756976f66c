//! Error types for the fichas-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the fichas library.
#[derive(Error, Debug)]
pub enum FichasError {
    /// Transcription provider failure.
    #[error("transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Record construction failure.
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    /// Artifact export failure.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning an image into raw text.
#[derive(Error, Debug)]
pub enum TranscriptionError {
    /// The image could not be opened or decoded.
    #[error("failed to load image {path}: {reason}")]
    ImageLoad { path: PathBuf, reason: String },

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The recognition backend failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// No sidecar transcript exists for the image.
    #[error("no transcript found at {0}")]
    MissingTranscript(PathBuf),

    /// I/O error while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building a record from raw text.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The builder aborted unexpectedly.
    #[error("record builder aborted: {0}")]
    Aborted(String),
}

/// Errors raised while serializing or writing export artifacts.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Writing an artifact to disk failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Serialized output was not valid UTF-8.
    #[error("invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The in-memory CSV buffer could not be recovered.
    #[error("failed to flush CSV buffer: {0}")]
    Flush(String),
}

/// Result type for the fichas library.
pub type Result<T> = std::result::Result<T, FichasError>;
