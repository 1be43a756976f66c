//! Batch aggregation: transcribe and build one record per input.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::BuildError;
use crate::extract::RecordBuilder;
use crate::models::record::{BatchEntry, ErrorEntry, Record, RecordBatch};
use crate::transcribe::Transcriber;

/// One input to process: an identifier and the image it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub source_id: String,
    pub path: PathBuf,
}

impl BatchInput {
    pub fn new(source_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            source_id: source_id.into(),
            path: path.into(),
        }
    }

    /// Use the file name as the source id.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { source_id, path }
    }
}

/// Runs the transcriber and builder over a sequence of inputs.
///
/// Every input produces exactly one entry; a failing input becomes an
/// [`ErrorEntry`] and processing moves on.
pub struct RecordAggregator<'a, T: Transcriber + ?Sized> {
    transcriber: &'a T,
    builder: &'a RecordBuilder,
}

impl<'a, T: Transcriber + ?Sized> RecordAggregator<'a, T> {
    pub fn new(transcriber: &'a T, builder: &'a RecordBuilder) -> Self {
        Self {
            transcriber,
            builder,
        }
    }

    /// Process all inputs, sorted by source id.
    pub fn process_batch(&self, inputs: Vec<BatchInput>) -> RecordBatch {
        self.process_batch_with(inputs, |_, _, _| {})
    }

    /// Like [`process_batch`](Self::process_batch), calling
    /// `observer(index, total, entry)` after each entry is appended.
    pub fn process_batch_with<F>(&self, mut inputs: Vec<BatchInput>, mut observer: F) -> RecordBatch
    where
        F: FnMut(usize, usize, &BatchEntry),
    {
        let start = Instant::now();
        inputs.sort_by(|a, b| a.source_id.cmp(&b.source_id));

        let total = inputs.len();
        let mut batch = RecordBatch::new();

        info!("Processing {} inputs", total);

        for (index, input) in inputs.iter().enumerate() {
            let entry = self.process_one(input);
            batch.push(entry);
            if let Some(entry) = batch.entries().last() {
                observer(index, total, entry);
            }
        }

        info!(
            "Processed {} inputs in {:?}: {} succeeded, {} failed",
            total,
            start.elapsed(),
            batch.succeeded(),
            batch.failed()
        );

        batch
    }

    /// Transcribe and build a single input.
    pub fn process_one(&self, input: &BatchInput) -> BatchEntry {
        info!("Processing {}", input.source_id);

        let text = match self.transcriber.transcribe(&input.path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Transcription failed for {}: {}", input.source_id, e);
                return ErrorEntry::transcription(&input.source_id, &e).into();
            }
        };

        let built = catch_build(|| self.builder.build(&input.source_id, &text));
        build_entry(&input.source_id, built)
    }
}

/// Run a record build, turning a panic into [`BuildError::Aborted`].
fn catch_build<F>(build: F) -> Result<Record, BuildError>
where
    F: FnOnce() -> Record,
{
    panic::catch_unwind(AssertUnwindSafe(build)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        BuildError::Aborted(reason)
    })
}

fn build_entry(source_id: &str, built: Result<Record, BuildError>) -> BatchEntry {
    match built {
        Ok(record) => record.into(),
        Err(e) => {
            warn!("Building record failed for {}: {}", source_id, e);
            ErrorEntry::build(source_id, &e).into()
        }
    }
}
