//! Human-readable text report.

use chrono::{DateTime, Local};

use crate::models::record::{BatchEntry, ErrorEntry, FieldKind, Record, RecordBatch};

const RULE_WIDTH: usize = 80;
const HEADING_WIDTH: usize = 21;

/// Render the report for `batch`.
pub fn render(batch: &RecordBatch, processed_at: &DateTime<Local>, placeholder: &str) -> String {
    let banner = "=".repeat(RULE_WIDTH);
    let mut output = String::new();

    output.push_str(&format!("{}\n", banner));
    output.push_str("INFORMACIÓN EXTRAÍDA DE IMÁGENES\n");
    output.push_str(&format!(
        "Fecha de procesamiento: {}\n",
        processed_at.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str(&format!("{}\n\n", banner));

    for (i, entry) in batch.entries().iter().enumerate() {
        output.push_str(&format!("\n{}\n", banner));
        output.push_str(&format!("REGISTRO #{}\n", i + 1));
        output.push_str(&format!("Archivo: {}\n", entry.source_id()));
        output.push_str(&format!("{}\n\n", banner));

        match entry {
            BatchEntry::Failed(failed) => output.push_str(&format_failure(failed)),
            BatchEntry::Record(record) => output.push_str(&format_record(record, placeholder)),
        }

        output.push('\n');
    }

    output
}

fn format_failure(failed: &ErrorEntry) -> String {
    format!("ERROR: {}\n", failed.error)
}

fn format_record(record: &Record, placeholder: &str) -> String {
    let mut output = String::new();

    for kind in FieldKind::ALL {
        output.push_str(&format!(
            "{:<width$}{}\n",
            format!("{}:", kind.report_heading()),
            record.field(kind).unwrap_or(placeholder),
            width = HEADING_WIDTH
        ));
    }

    if !record.extra_fields().is_empty() {
        output.push_str("\nOTROS CAMPOS:\n");
        for (label, value) in record.extra_fields() {
            output.push_str(&format!("  {}: {}\n", label, value));
        }
    }

    output.push_str("\nTEXTO COMPLETO:\n");
    output.push_str(&format!("{}\n", "-".repeat(RULE_WIDTH)));
    output.push_str(&format!("{}\n", record.full_text()));

    output
}
