//! Process command - extract a record from a single image.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use fichas_core::models::record::{FieldKind, Record};
use fichas_core::{BatchInput, RecordBuilder};

use super::{create_transcriber, load_config, Engine};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input image
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Transcription engine
    #[arg(short, long, value_enum, default_value = "onnx")]
    engine: Engine,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let transcriber = create_transcriber(args.engine, &config, args.model_dir.as_ref())?;
    let input = BatchInput::from_path(&args.input);

    let text = transcriber.transcribe(&input.path)?;
    let record = RecordBuilder::from_config(&config.extraction).build(&input.source_id, &text);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
        OutputFormat::Text => format_text(&record, &config.export.missing_placeholder),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_text(record: &Record, placeholder: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Archivo: {}\n", record.source_id()));
    for kind in FieldKind::ALL {
        output.push_str(&format!(
            "  {:<18}{}\n",
            format!("{}:", kind.report_heading()),
            record.field(kind).unwrap_or(placeholder)
        ));
    }

    if !record.extra_fields().is_empty() {
        output.push_str("\nOtros campos:\n");
        for (label, value) in record.extra_fields() {
            output.push_str(&format!("  {}: {}\n", label, value));
        }
    }

    output
}
