use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ticket_topics::assign::{
    NmfAssigner, NmfConfig, PrecomputedAssigner, TimeoutAssigner, TopicAssigner,
};
use ticket_topics::config::{
    default_metadata_columns, ColumnSelection, Language, LanguageConfig, RowLimit, RunConfig,
    DEFAULT_ID_COLUMN, DEFAULT_OUTPUT_DIR,
};
use ticket_topics::forbidden::ForbiddenWordSet;
use ticket_topics::pipeline::Pipeline;
use ticket_topics::resources::LanguageResources;
use ticket_topics::sentiment::VaderScorer;
use ticket_topics::table::Table;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "ticket-topics",
    version,
    about = "Discover topics in ticket descriptions and write browsable topic reports"
)]
struct Cli {
    /// Ticket table (.json, .csv, .tsv)
    table: PathBuf,

    /// Newline-delimited words to exclude from analysis
    forbidden_words: PathBuf,

    /// Text columns to analyze, comma-separated indices or names (prompted if omitted)
    #[arg(short, long)]
    columns: Option<String>,

    /// Number of rows to analyze: `all` or an integer (prompted if omitted)
    #[arg(short, long)]
    rows: Option<String>,

    /// Column holding the unique record identifier
    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    id_column: String,

    /// Metadata columns shown in the report, comma-separated
    #[arg(long, value_delimiter = ',')]
    metadata: Option<Vec<String>>,

    /// Number of topics to discover
    #[arg(short = 'k', long, default_value_t = 10)]
    topics: usize,

    /// Representative terms kept per topic
    #[arg(long, default_value_t = 10)]
    terms: usize,

    /// Topics smaller than this are merged into the outlier topic
    #[arg(long, default_value_t = 2)]
    min_topic_size: usize,

    /// NMF iterations
    #[arg(long, default_value_t = 200)]
    iterations: usize,

    /// Maximum vocabulary size for NMF
    #[arg(long, default_value_t = 5000)]
    vocab: usize,

    /// Stopword languages, comma-separated: dutch, english
    #[arg(long, default_value = "dutch,english")]
    languages: String,

    /// Apply a Snowball stemmer for this language after lemmatization
    #[arg(long)]
    stem: Option<String>,

    /// Precomputed topic assignments (JSON) instead of running NMF
    #[arg(long)]
    assignments: Option<PathBuf>,

    /// Give up on topic assignment after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Skip sentiment scoring
    #[arg(long)]
    no_sentiment: bool,

    /// Output directory for report artifacts
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Also print the report data as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ticket_topics=info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let table = Table::load(&cli.table)
        .with_context(|| format!("loading table {}", cli.table.display()))?;
    let forbidden = ForbiddenWordSet::load(&cli.forbidden_words)
        .with_context(|| format!("loading forbidden words {}", cli.forbidden_words.display()))?;

    let columns = match cli.columns {
        Some(c) => c,
        None => prompt_columns(table.columns())?,
    };
    let rows = match cli.rows {
        Some(r) => r,
        None => prompt(&format!("How many rows to analyze? (all or 1-{}): ", table.len()))?,
    };

    let selection = ColumnSelection::parse(&columns)?;
    let row_limit: RowLimit = rows.parse()?;
    let metadata = cli.metadata.unwrap_or_else(default_metadata_columns);
    let config = RunConfig::resolve(
        table.columns(),
        &selection,
        &metadata,
        &cli.id_column,
        row_limit,
    )?;

    let stemming = match cli.stem.as_deref() {
        Some(name) => Some(
            name.parse::<Language>()
                .context("choosing the stemming language")?,
        ),
        None => None,
    };
    let resources = LanguageResources::init(&LanguageConfig {
        languages: LanguageConfig::parse_languages(&cli.languages)?,
        stemming,
    });

    let assigner: Box<dyn TopicAssigner> = match cli.assignments {
        Some(path) => {
            let precomputed = PrecomputedAssigner::load(&path)
                .with_context(|| format!("loading assignments {}", path.display()))?;
            with_timeout(precomputed, cli.timeout)
        }
        None => with_timeout(
            NmfAssigner::new(NmfConfig {
                topics: cli.topics,
                terms_per_topic: cli.terms,
                max_iter: cli.iterations,
                vocab_limit: cli.vocab,
                min_topic_size: cli.min_topic_size,
                ..NmfConfig::default()
            }),
            cli.timeout,
        ),
    };

    let mut pipeline = Pipeline::new(&resources, &forbidden);
    if !cli.no_sentiment {
        pipeline = pipeline.with_sentiment(&VaderScorer);
    }
    let output = pipeline.run(&table, &config, assigner.as_ref())?;
    let written = output
        .write_artifacts(&cli.output)
        .with_context(|| format!("writing report to {}", cli.output.display()))?;
    info!(files = written.len(), dir = %cli.output.display(), "report ready");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output.report)?);
    }
    Ok(())
}

fn with_timeout<A>(assigner: A, timeout: Option<u64>) -> Box<dyn TopicAssigner>
where
    A: TopicAssigner + Send + Sync + 'static,
{
    match timeout {
        Some(secs) => Box::new(TimeoutAssigner::new(assigner, Duration::from_secs(secs))),
        None => Box::new(assigner),
    }
}

fn prompt(question: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{question}")?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading answer from stdin")?;
    Ok(line.trim().to_string())
}

fn prompt_columns(columns: &[String]) -> Result<String> {
    eprintln!("Available columns:");
    for (i, name) in columns.iter().enumerate() {
        eprintln!("  {i}: {name}");
    }
    prompt("Columns to analyze (comma-separated numbers or names): ")
}
