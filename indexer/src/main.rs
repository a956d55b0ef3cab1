use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quarry_core::builder::build_index;
use quarry_core::persist::{save_meta, IndexPaths, MetaFile};
use quarry_core::tokenizer::tokenize;
use quarry_core::{DocId, IndexConfig};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: DocId,
    #[allow(dead_code)]
    title: Option<String>,
    body: String,
}

#[derive(Parser)]
#[command(name = "quarry-indexer")]
#[command(about = "Build a positional inverted index with SPIMI block merging", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from input JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Documents per SPIMI block
        #[arg(long, default_value_t = 1000)]
        block_size: usize,
        /// Top-frequency terms cached per document for relevance feedback
        #[arg(long, default_value_t = 5)]
        important_words: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, block_size, important_words } => {
            build(&input, &output, block_size, important_words)
        }
    }
}

fn build(input: &str, output: &str, block_size: usize, important_words: usize) -> Result<()> {
    let input_path = Path::new(input);

    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }

    let mut docs: Vec<(DocId, Vec<String>)> = Vec::new();
    for file in &files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(file, &mut docs)?;
        } else {
            read_json(file, &mut docs)?;
        }
    }
    tracing::info!(num_docs = docs.len(), num_files = files.len(), "ingested documents");

    let config = IndexConfig { block_size, important_words_per_doc: important_words };
    let out_dir = Path::new(output);
    let num_docs = build_index(docs, out_dir, &config)?;

    let meta = MetaFile {
        num_docs,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&IndexPaths::new(out_dir), &meta)?;

    tracing::info!(output, "index build complete");
    Ok(())
}

fn read_jsonl(file: &Path, docs: &mut Vec<(DocId, Vec<String>)>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("open {}", file.display()))?;
    let reader = BufReader::new(f);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("malformed document in {}", file.display()))?;
        docs.push((doc.id, tokenize(&doc.body)));
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<(DocId, Vec<String>)>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("open {}", file.display()))?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: InputDoc = serde_json::from_value(v)
                    .with_context(|| format!("malformed document in {}", file.display()))?;
                docs.push((doc.id, tokenize(&doc.body)));
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDoc = serde_json::from_value(json)
                .with_context(|| format!("malformed document in {}", file.display()))?;
            docs.push((doc.id, tokenize(&doc.body)));
        }
        _ => {}
    }
    Ok(())
}
