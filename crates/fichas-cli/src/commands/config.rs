//! Config command - inspect and edit the JSON configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use fichas_core::models::config::FichasConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with default settings
    Init {
        /// Where to write it (default: the config path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one setting, e.g. "export.missing_placeholder"
    Get { key: String },

    /// Change one setting; values that are not JSON are stored as strings
    Set { key: String, value: String },

    /// Print the config path and whether the file exists
    Path,
}

/// The configuration file the subcommands operate on.
struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    fn resolve(explicit: Option<&str>) -> Self {
        let path = explicit.map(PathBuf::from).unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("fichas")
                .join("config.json")
        });
        Self { path }
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    /// The stored settings, or defaults when there is no file yet.
    fn load_or_default(&self) -> anyhow::Result<FichasConfig> {
        if self.exists() {
            Ok(FichasConfig::from_file(&self.path)?)
        } else {
            Ok(FichasConfig::default())
        }
    }
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let file = ConfigFile::resolve(config_path);

    match args.command {
        ConfigCommand::Show => {
            if !file.exists() {
                println!(
                    "{} No config file found, showing defaults.",
                    style("ℹ").blue()
                );
            }
            let config = file.load_or_default()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { output, force } => {
            let target = output.unwrap_or_else(|| file.path.clone());
            if target.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    target.display()
                );
            }
            write_config(&FichasConfig::default(), &target)?;
            println!(
                "{} Created configuration file at {}",
                style("✓").green(),
                target.display()
            );
        }
        ConfigCommand::Get { key } => {
            let tree = serde_json::to_value(file.load_or_default()?)?;
            println!("{}", serde_json::to_string_pretty(value_at(&tree, &key)?)?);
        }
        ConfigCommand::Set { key, value } => {
            let value = parse_value(&value);
            let mut tree = serde_json::to_value(file.load_or_default()?)?;
            set_value_at(&mut tree, &key, value.clone())?;

            let config: FichasConfig = serde_json::from_value(tree)?;
            config.validate()?;
            write_config(&config, &file.path)?;

            println!(
                "{} Set {} = {}",
                style("✓").green(),
                key,
                serde_json::to_string(&value)?
            );
        }
        ConfigCommand::Path => {
            println!("Configuration file: {}", file.path.display());
            if file.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!();
                println!("Run 'fichas config init' to create a configuration file.");
            }
        }
    }

    Ok(())
}

fn write_config(config: &FichasConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Follow a dotted key such as `ocr.rotate_degrees`.
fn value_at<'a>(tree: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(tree, |node, part| {
        node.get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Replace the value under an existing dotted key.
fn set_value_at(tree: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let slot = key.split('.').try_fold(tree, |node, part| {
        node.get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })?;
    *slot = value;
    Ok(())
}
