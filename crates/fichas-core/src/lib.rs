//! Core library for extracting personal records from transcribed cards.
//!
//! This crate provides:
//! - Transcription providers (pure Rust OCR, sidecar transcripts)
//! - Keyword-rule line classification and record building
//! - Batch aggregation with per-input failure isolation
//! - Report, JSON and CSV export of a record batch

pub mod batch;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod schema;
pub mod transcribe;

pub use batch::{BatchInput, RecordAggregator};
pub use error::{BuildError, ExportError, FichasError, Result, TranscriptionError};
pub use export::{ExportBundle, ExportPaths, Exporter};
pub use extract::{KeywordRule, LineClass, RecordBuilder, RuleSet};
pub use models::config::FichasConfig;
pub use models::record::{BatchEntry, ErrorEntry, FailureKind, FieldKind, Record, RecordBatch};
pub use schema::unify;
pub use transcribe::{SidecarTranscriber, Transcriber};

#[cfg(feature = "native")]
pub use transcribe::OnnxTranscriber;
