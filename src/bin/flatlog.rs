//! flatlog: Flatten an XML event log into a single CSV table
//!
//! Usage:
//!   # Convert an exported event log
//!   flatlog events.xml events.csv
//!
//!   # Records are <Row> elements, and the file should open cleanly in Excel
//!   flatlog --record-tag Row --bom export.xml export.csv
//!
//!   # Only show which columns the output would have
//!   flatlog --print-columns events.xml unused.csv

// Use MiMalloc allocator for better performance on large forests
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use flatlog::{FlattenConfig, WriterConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flatlog")]
#[command(about = "Flatten XML event records into a CSV table", long_about = None)]
struct Args {
    /// Input XML file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (must not exist yet)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Tag allowed for top-level records, may be repeated (default: Event)
    #[arg(long = "record-tag", value_name = "TAG")]
    record_tags: Vec<String>,

    /// Repeated sibling tag named by its name attribute (default: Data)
    #[arg(long)]
    named_variant_tag: Option<String>,

    /// Attribute naming a named variant (default: Name)
    #[arg(long)]
    name_attribute: Option<String>,

    /// Parent tag numbered by its index attribute (default: Substitution)
    #[arg(long)]
    positional_variant_tag: Option<String>,

    /// Attribute numbering a positional variant (default: index)
    #[arg(long)]
    index_attribute: Option<String>,

    /// Separator between column name parts (default: "_")
    #[arg(long)]
    separator: Option<String>,

    /// Output field separator (default: ';')
    #[arg(long)]
    field_separator: Option<char>,

    /// Start the output with a UTF-8 byte order mark
    #[arg(long)]
    bom: bool,

    /// Print the discovered columns as JSON instead of writing OUTPUT
    #[arg(long)]
    print_columns: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Build config
    let mut config = FlattenConfig::default();
    if !args.record_tags.is_empty() {
        config.record_tags = args.record_tags;
    }
    if let Some(tag) = args.named_variant_tag {
        config.named_variant_tag = tag;
    }
    if let Some(attr) = args.name_attribute {
        config.name_attribute = attr;
    }
    if let Some(tag) = args.positional_variant_tag {
        config.positional_variant_tag = tag;
    }
    if let Some(attr) = args.index_attribute {
        config.index_attribute = attr;
    }
    if let Some(sep) = args.separator {
        config.separator = sep;
    }

    let mut writer_config = WriterConfig::default();
    if let Some(sep) = args.field_separator {
        writer_config.field_separator = sep;
    }
    writer_config.byte_order_mark = args.bom;

    if args.print_columns {
        let input = std::fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read {}", args.input.display()))?;
        let columns = flatlog::discover_columns(&input, &config)
            .with_context(|| format!("Failed to discover columns of {}", args.input.display()))?;
        println!("{}", serde_json::to_string_pretty(&columns)?);
        return Ok(());
    }

    let summary = flatlog::convert_file(&args.input, &args.output, &config, &writer_config)
        .with_context(|| {
            format!(
                "Failed to convert {} into {}",
                args.input.display(),
                args.output.display()
            )
        })?;

    info!(columns = summary.columns, rows = summary.rows, "wrote output");
    Ok(())
}
