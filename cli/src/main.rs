use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use word_discovery_core::{Config, Pipeline};

/// Discover Chinese words from a corpus of raw text documents.
#[derive(Parser)]
struct Opts {
    /// Directory to read input documents from, recursively.
    input_dir: PathBuf,

    /// Where to write the final `word count` vocabulary file.
    #[clap(short, long, default_value = "vocab.txt")]
    output: PathBuf,

    /// Scratch directory for intermediate pipeline files (corpus text,
    /// counter vocab, binary n-grams). Defaults to a sibling of `output`.
    #[clap(long)]
    work_dir: Option<PathBuf>,

    /// Path to a TOML config file overriding the default pipeline settings.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON run report alongside the vocabulary file.
    #[clap(long)]
    report: Option<PathBuf>,

    /// Only consider files with this extension (e.g. "txt").
    #[clap(long, default_value = "txt")]
    ext: String,
}

fn collect_documents(input_dir: &std::path::Path, ext: &str) -> Result<Vec<String>> {
    let mut docs = Vec::new();
    for entry in walkdir::WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        docs.push(content);
    }
    Ok(docs)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let config = match &opts.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let work_dir = opts
        .work_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("word-discovery-work"));

    tracing::info!(input_dir = %opts.input_dir.display(), "collecting documents");
    let documents = collect_documents(&opts.input_dir, &opts.ext)?;
    tracing::info!(count = documents.len(), "collected documents");

    let pipeline = Pipeline::new(config);
    let report = pipeline.run(documents, &work_dir, &opts.output)?;

    tracing::info!(words = report.final_vocabulary_size, output = %opts.output.display(), "vocabulary written");

    if let Some(report_path) = &opts.report {
        report
            .write(report_path)
            .with_context(|| format!("writing report to {}", report_path.display()))?;
    }

    Ok(())
}
