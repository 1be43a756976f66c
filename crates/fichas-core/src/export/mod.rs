//! Export of a record batch to report, JSON and CSV artifacts.
//!
//! All three artifacts are rendered from the same in-memory batch; none of
//! them re-derives field values from the transcripts.

pub mod report;
pub mod tabular;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::ExportError;
use crate::models::config::ExportConfig;
use crate::models::record::RecordBatch;
use crate::schema::unify;

/// The three rendered artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    /// Human-readable report.
    pub report: String,
    /// JSON array with one object per entry.
    pub structured: String,
    /// CSV with one row per successful record.
    pub tabular: String,
}

/// Where each artifact is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub report: PathBuf,
    pub structured: PathBuf,
    pub tabular: PathBuf,
}

impl ExportPaths {
    /// Derive `.json` and `.csv` siblings from the report path.
    pub fn from_report_path(report: impl Into<PathBuf>) -> Self {
        let report = report.into();
        Self {
            structured: report.with_extension("json"),
            tabular: report.with_extension("csv"),
            report,
        }
    }

    /// `<dir>/<stem>.txt`, `<dir>/<stem>.json`, `<dir>/<stem>.csv`.
    pub fn in_dir(dir: &Path, stem: &str) -> Self {
        Self::from_report_path(dir.join(format!("{stem}.txt")))
    }
}

impl ExportBundle {
    /// Write report, JSON and CSV in that order.
    ///
    /// Stops at the first failure; files already written are left in place.
    pub fn write(&self, paths: &ExportPaths) -> Result<(), ExportError> {
        for (path, content) in [
            (&paths.report, &self.report),
            (&paths.structured, &self.structured),
            (&paths.tabular, &self.tabular),
        ] {
            fs::write(path, content).map_err(|source| ExportError::Write {
                path: path.clone(),
                source,
            })?;
            debug!("Wrote {}", path.display());
        }
        Ok(())
    }
}

/// Renders a batch into the three artifacts.
#[derive(Debug, Clone)]
pub struct Exporter {
    placeholder: String,
    processed_at: DateTime<Local>,
}

impl Exporter {
    /// Create an exporter stamped with the current time.
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            placeholder: config.missing_placeholder.clone(),
            processed_at: Local::now(),
        }
    }

    /// Override the processing timestamp shown in the report.
    pub fn with_timestamp(mut self, processed_at: DateTime<Local>) -> Self {
        self.processed_at = processed_at;
        self
    }

    /// Render all three artifacts for `batch` using the unified `schema`.
    pub fn export(&self, batch: &RecordBatch, schema: &[String]) -> Result<ExportBundle, ExportError> {
        let bundle = ExportBundle {
            report: report::render(batch, &self.processed_at, &self.placeholder),
            structured: serde_json::to_string_pretty(batch)?,
            tabular: tabular::render(batch, schema)?,
        };

        info!(
            "Exported {} entries ({} extra columns)",
            batch.len(),
            schema.len()
        );

        Ok(bundle)
    }
}

/// Unify the schema, render and write all three artifacts.
pub fn export_to(
    batch: &RecordBatch,
    config: &ExportConfig,
    paths: &ExportPaths,
) -> crate::Result<ExportBundle> {
    let schema = unify(batch);
    let bundle = Exporter::new(config).export(batch, &schema)?;
    bundle.write(paths)?;
    Ok(bundle)
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(&ExportConfig::default())
    }
}
