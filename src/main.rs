use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use neardup::{
    demo_corpus, find_duplicates, render_json_report, render_text_report, NeardupConfig,
    OutputFormat,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Report near-duplicate documents in a batch.
///
/// Each FILE is read as one document. Without files the built-in demo
/// corpus is processed.
#[derive(Parser, Debug)]
#[command(name = "neardup", version)]
#[command(about = "Find near-duplicate texts with token n-gram MinHash signatures")]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, env = "NEARDUP_CONFIG")]
    config: Option<PathBuf>,

    /// Print the report as JSON regardless of `output.format`.
    #[arg(long)]
    json: bool,

    /// Documents to compare, one per file.
    files: Vec<PathBuf>,
}

fn init_tracing(config: &NeardupConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.output.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => NeardupConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NeardupConfig::default(),
    };
    init_tracing(&config);

    let docs: Vec<String> = if args.files.is_empty() {
        demo_corpus().iter().map(|doc| doc.to_string()).collect()
    } else {
        args.files
            .iter()
            .map(|path| {
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
            })
            .collect::<Result<_>>()?
    };

    let dedup_config = config.to_dedup_config();
    info!(
        documents = docs.len(),
        num_hashes = dedup_config.num_hashes,
        threshold = dedup_config.threshold,
        "neardup_start"
    );
    let pairs = find_duplicates(&docs, &dedup_config)?;

    let json = args.json || config.output.format == OutputFormat::Json;
    if json {
        println!("{}", render_json_report(&docs, &pairs)?);
    } else {
        print!("{}", render_text_report(&docs, &pairs));
    }
    Ok(())
}
