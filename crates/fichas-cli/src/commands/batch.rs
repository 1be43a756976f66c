//! Batch processing command for a folder of card images.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use fichas_core::export::{export_to, ExportPaths};
use fichas_core::models::record::{BatchEntry, FieldKind};
use fichas_core::{BatchInput, RecordAggregator, RecordBuilder};

use super::{create_transcriber, load_config, Engine};

/// Image extensions picked up from the input folder.
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tiff"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern
    #[arg(required = true)]
    input: String,

    /// Report path; the JSON and CSV files are written next to it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Transcription engine
    #[arg(short, long, value_enum, default_value = "onnx")]
    engine: Engine,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Overwrite existing output files
    #[arg(long)]
    force: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = discover_images(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching images found for: {}", args.input);
    }

    println!(
        "{} Found {} images to process",
        style("ℹ").blue(),
        files.len()
    );

    let paths = match &args.output {
        Some(report) => ExportPaths::from_report_path(report),
        None => ExportPaths::in_dir(Path::new("."), &config.export.output_stem),
    };

    if !args.force {
        for path in [&paths.report, &paths.structured, &paths.tabular] {
            if path.exists() {
                anyhow::bail!(
                    "Output file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
        }
    }

    let transcriber = create_transcriber(args.engine, &config, args.model_dir.as_ref())?;
    let builder = RecordBuilder::from_config(&config.extraction);
    let aggregator = RecordAggregator::new(&*transcriber, &builder);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let inputs: Vec<BatchInput> = files.into_iter().map(BatchInput::from_path).collect();
    let batch = aggregator.process_batch_with(inputs, |_, _, entry| {
        report_entry(&pb, entry);
        pb.inc(1);
    });

    pb.finish_with_message("Complete");

    export_to(&batch, &config.export, &paths)?;

    println!();
    println!(
        "{} Processed {} images in {:?}",
        style("✓").green(),
        batch.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(batch.succeeded()).green(),
        style(batch.failed()).red()
    );

    println!();
    println!("Results written to:");
    println!("  - {} (report)", paths.report.display());
    println!("  - {} (JSON)", paths.structured.display());
    println!("  - {} (CSV)", paths.tabular.display());

    if batch.failed() > 0 {
        println!();
        println!("{}", style("Failed images:").red());
        for failed in batch.failures() {
            println!("  - {}: {}", failed.source_id, failed.error);
        }
    }

    Ok(())
}

/// Print a one-line status for a finished entry above the progress bar.
fn report_entry(pb: &ProgressBar, entry: &BatchEntry) {
    match entry {
        BatchEntry::Record(record) => {
            let show = |kind| record.field(kind).unwrap_or("-");
            pb.println(format!(
                "{} {}  {} {} | {}",
                style("✓").green(),
                record.source_id(),
                show(FieldKind::GivenName),
                show(FieldKind::FamilyName),
                show(FieldKind::Phone)
            ));
        }
        BatchEntry::Failed(failed) => {
            warn!("Failed to process {}: {}", failed.source_id, failed.error);
            pb.println(format!(
                "{} {}  {}",
                style("✗").red(),
                failed.source_id,
                failed.error
            ));
        }
    }
}

/// Expand a directory or glob pattern into image paths.
fn discover_images(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = if Path::new(input).is_dir() {
        Path::new(input).join("*").to_string_lossy().into_owned()
    } else {
        input.to_string()
    };

    debug!("Searching for images with pattern {}", pattern);

    let files = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_image(p))
        .collect();

    Ok(files)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
