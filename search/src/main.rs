use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use quarry_core::persist::{load_meta, IndexPaths};
use quarry_core::{RankingModel, SearchConfig, Searcher};
use tracing_subscriber::{fmt, EnvFilter};

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Model {
    Tfidf,
    Bm25,
}

#[derive(Parser)]
#[command(name = "quarry-search")]
#[command(about = "Answer boolean and ranked queries against a built index", long_about = None)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// File with one query per line
    #[arg(long)]
    queries: Option<PathBuf>,
    /// Output file for query results (one line per query)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Run a single query instead of a query file
    #[arg(long)]
    query: Option<String>,
    /// Scoring model
    #[arg(long, value_enum, default_value_t = Model::Tfidf)]
    model: Model,
    /// Benchmark multiplier for the low-score noise filter
    #[arg(long, default_value_t = 1.2)]
    filter_strength: f32,
    /// Run one pseudo-relevance-feedback round per query
    #[arg(long, default_value_t = false)]
    prf: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = SearchConfig {
        model: match args.model {
            Model::Tfidf => RankingModel::TfIdfCosine,
            Model::Bm25 => RankingModel::bm25(),
        },
        filter_strength: args.filter_strength,
        use_prf: args.prf,
        ..Default::default()
    };

    if let Ok(meta) = load_meta(&IndexPaths::new(&args.index)) {
        tracing::info!(num_docs = meta.num_docs, created_at = %meta.created_at, "opening index");
    }
    let mut searcher = Searcher::open(&args.index, config)?;

    if let Some(query) = args.query {
        println!("{}", render(&searcher.search(&query)?));
        return Ok(());
    }

    let Some(queries) = args.queries else {
        bail!("either --query or --queries is required");
    };
    let in_file =
        File::open(&queries).with_context(|| format!("open {}", queries.display()))?;
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };

    for line in BufReader::new(in_file).lines() {
        let query = line?;
        let result = if query.trim().is_empty() {
            Vec::new()
        } else {
            searcher.search(&query)?
        };
        writeln!(out, "{}", render(&result))?;
    }
    out.flush()?;
    Ok(())
}

fn render(doc_ids: &[quarry_core::DocId]) -> String {
    doc_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(" ")
}
