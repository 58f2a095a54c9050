use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally::{commands, Settings, DEFAULT_TOP_K};

#[derive(Parser)]
#[command(name = "tally")]
#[command(
  about = "Tally - causes-of-death retrieval and statistics\nVector search over dataset rows plus per-year extremes and trends"
)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), ", courtesy of Kernelle Software"))]
struct Cli {
  /// Path to a JSON settings file
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

// violet ignore chunk
#[derive(Subcommand)]
enum Command {
  /// Build the vector index from the dataset (skipped if it already exists)
  Index {
    /// Delete an existing index and rebuild it. The old index is removed first, so a failed build leaves none
    #[arg(short, long)]
    force: bool,
  },
  /// Find the dataset rows nearest to a free-text query
  Search {
    /// Number of results to return
    #[arg(short, default_value_t = DEFAULT_TOP_K)]
    k: usize,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
    #[arg(required = true)]
    query: Vec<String>,
  },
  /// Highest or lowest cause of death in a year, e.g. "tertinggi tahun 2015"
  Extremes {
    #[arg(required = true)]
    question: Vec<String>,
  },
  /// Multi-year trend for one cause of death
  Trend {
    #[arg(required = true)]
    question: Vec<String>,
  },
  /// Summarise what the dataset records about a topic
  Info {
    #[arg(required = true)]
    topic: Vec<String>,
  },
  /// General health advice for the categories related to a topic
  Recommend {
    #[arg(required = true)]
    topic: Vec<String>,
  },
}

fn handle(command: Command, settings: &Settings) -> Result<()> {
  match command {
    Command::Index { force } => commands::build_index(settings, force),
    Command::Search { k, json, query } => commands::search(settings, &query, k, json),
    Command::Extremes { question } => commands::extremes(settings, &question),
    Command::Trend { question } => commands::trend(settings, &question),
    Command::Info { topic } => commands::info(settings, &topic),
    Command::Recommend { topic } => commands::recommend(settings, &topic),
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  bentley::init_tracing(cli.verbose);

  let settings = Settings::load(cli.config.as_deref())?;
  bentley::debug!("dataset: {}", settings.dataset_path.display());
  bentley::debug!("index: {}", settings.index_path.display());

  handle(cli.command, &settings)
}
