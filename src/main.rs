use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use reelscrap::item::ItemStatus;
use reelscrap::process::Pipeline;
use reelscrap::request::HttpFetcher;
use reelscrap::settings::Settings;
use reelscrap::store::WorklistStore;
use reelscrap::table::{self, Delim};
use reelscrap::{info_time, Result};
use tokio::sync::oneshot;
use tracing::warn;

#[derive(Parser)]
#[command(name = "reelscrap", about = "Polite, resumable film metadata scraper")]
struct Cli {
    /// Config file (default: ./reelscrap.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and merge every pending item from one source
    Run {
        /// Configured source name (wikipedia, imdb, imsdb, ...)
        #[arg(short, long)]
        source: String,
        #[arg(long)]
        store: PathBuf,
        /// Max items to process (default: all pending)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Add items from a file of `identity<TAB>locator` lines
    Seed {
        #[arg(long)]
        store: PathBuf,
        input: PathBuf,
    },
    /// Show item counts per status
    Status {
        #[arg(long)]
        store: PathBuf,
    },
    /// Put failed items back to pending so the next run retries them
    Reset {
        #[arg(long)]
        store: PathBuf,
        #[arg(long, value_enum)]
        status: FailedStatus,
    },
    /// Write the store as a CSV (or TSV) table
    Export {
        #[arg(long)]
        store: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long)]
        tsv: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FailedStatus {
    NotFound,
    NoData,
}

impl From<FailedStatus> for ItemStatus {
    fn from(value: FailedStatus) -> Self {
        match value {
            FailedStatus::NotFound => ItemStatus::FailedNotFound,
            FailedStatus::NoData => ItemStatus::FailedNoData,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let start_time = Local::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            source,
            store,
            limit,
        } => {
            let source = settings.source(&source)?;
            let fetcher = HttpFetcher::new(&settings.http)?;
            let mut store = WorklistStore::load(store)?;

            let (stop_tx, stop_rx) = oneshot::channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Stop requested, unfinished items stay pending");
                    let _ = stop_tx.send(());
                }
            });

            let pipeline = Pipeline::new(fetcher, source, &settings.pipeline);
            let summary = pipeline.run(&mut store, limit, Some(stop_rx)).await?;
            println!(
                "Dispatched {} fetch(es){}.",
                summary.dispatched,
                if summary.interrupted { " before stopping" } else { "" }
            );
            println!("This run: {}", summary.processed);
            println!("Store:    {}", summary.totals);
        }
        Commands::Seed { store, input } => {
            let mut store = WorklistStore::open_or_create(store)?;
            let items = table::parse_seed(&fs::read_to_string(input)?)?;
            let found = items.len();
            let added = table::seed_store(&mut store, items)?;
            store.save()?;
            println!(
                "Added {added} new item(s) ({found} in seed file) to {}.",
                store.path().display()
            );
        }
        Commands::Status { store } => {
            let store = WorklistStore::load(store)?;
            println!("{} item(s): {}", store.len(), store.summary());
        }
        Commands::Reset { store, status } => {
            let mut store = WorklistStore::load(store)?;
            let status = ItemStatus::from(status);
            let changed = store.reset(status);
            store.save()?;
            println!("Reset {changed} {status} item(s) to pending.");
        }
        Commands::Export { store, out, tsv } => {
            let store = WorklistStore::load(store)?;
            let delim = if tsv { Delim::Tsv } else { Delim::Csv };
            let file = BufWriter::new(File::create(&out)?);
            table::write_export(&store, file, delim)?;
            println!("Wrote {} row(s) to {}", store.len(), out.display());
        }
    }

    info_time!(start_time, "Full program time:");
    Ok(())
}
