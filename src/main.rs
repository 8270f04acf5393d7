// src/main.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use riro_extractor::items::{BoardItem, MealApplicationItem, PortfolioItem};
use riro_extractor::riro::{self, ClientConfig, DbId, DbInfo, PagePolicy, RiroClient};
use riro_extractor::storage::StorageManager;
use riro_extractor::utils::{self, AppError};
use riro_extractor::{calendar_from_html, SchemaRegistry, TableList, TableRecord};

/// Command Line Interface for Riro School board extraction
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory for extracted records
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract saved board pages, one file per page, merged in order
    Table {
        #[arg(short, long, value_enum)]
        kind: RecordKind,

        #[arg(short, long = "input", required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Extract a saved calendar page
    Calendar {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Log in (RIRO_ID / RIRO_PASSWORD) and fetch board pages live
    Fetch {
        #[arg(short, long, value_enum)]
        kind: RecordKind,

        #[arg(long, value_enum)]
        db: DbId,

        #[arg(long, default_value_t = 0)]
        category: u32,

        /// Total rows wanted; pages are requested 20 rows at a time
        #[arg(long, default_value_t = riro::PAGE_SIZE)]
        count: usize,

        #[arg(long, value_enum, default_value_t = PagePolicy::Fixed)]
        policy: PagePolicy,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RecordKind {
    Board,
    Meal,
    Portfolio,
}

fn save<T: TableRecord + Serialize>(
    storage: &StorageManager,
    list: &TableList<T>,
    source: &str,
) -> Result<(), AppError> {
    let path = storage.save_records(T::PATH, list)?;
    storage.save_metadata(T::PATH, list.len(), source)?;
    tracing::info!("Wrote {} {} records to {}", list.len(), T::KIND, path.display());
    Ok(())
}

/// Saves whatever was merged, then passes the paging result on. A run that
/// fails on page K still leaves pages 1..K-1 on disk.
fn save_merged<T: TableRecord + Serialize>(
    storage: &StorageManager,
    list: &TableList<T>,
    source: &str,
    result: Result<usize, AppError>,
) -> Result<(), AppError> {
    match result {
        Ok(pages) => {
            tracing::info!("Merged {} pages from {}", pages, source);
            save(storage, list, source)
        }
        Err(e) if !list.is_empty() => {
            tracing::warn!("Paging stopped early ({}); keeping {} {} records", e, list.len(), T::KIND);
            save(storage, list, source)?;
            Err(e)
        }
        Err(e) => Err(e),
    }
}

fn extract_saved<T: TableRecord + Serialize>(storage: &StorageManager, inputs: &[PathBuf]) -> Result<(), AppError> {
    // 1. Read every saved page up front
    let pages = inputs
        .iter()
        .map(std::fs::read_to_string)
        .collect::<Result<Vec<_>, _>>()?;
    let source = inputs.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(",");

    // 2. Merge them in the order given
    let mut list = TableList::new();
    let result = riro::table_from_pages::<T, _>(SchemaRegistry::global(), &pages, &mut list);

    // 3. Persist
    save_merged(storage, &list, &source, result)
}

async fn fetch_live<T: TableRecord + Serialize>(
    storage: &StorageManager,
    client: &RiroClient,
    info: &DbInfo,
    policy: PagePolicy,
) -> Result<(), AppError> {
    let mut list = TableList::new();
    let result = riro::fetch_table::<T, _>(client, SchemaRegistry::global(), info, policy, &mut list).await;
    save_merged(storage, &list, &format!("db={}", info.id.code()), result)
}

fn credential(name: &str) -> Result<String, AppError> {
    std::env::var(name).map_err(|_| AppError::Config(format!("{} must be set to log in", name)))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    match args.command {
        Command::Table { kind, inputs } => match kind {
            RecordKind::Board => extract_saved::<BoardItem>(&storage, &inputs)?,
            RecordKind::Meal => extract_saved::<MealApplicationItem>(&storage, &inputs)?,
            RecordKind::Portfolio => extract_saved::<PortfolioItem>(&storage, &inputs)?,
        },
        Command::Calendar { input } => {
            let html = std::fs::read_to_string(&input)?;
            let calendar = calendar_from_html(&html)?;
            let path = storage.save_records("calendar", &calendar)?;
            storage.save_metadata("calendar", calendar.len(), &input.display().to_string())?;
            tracing::info!("Wrote {} calendar days to {}", calendar.len(), path.display());
        }
        Command::Fetch { kind, db, category, count, policy } => {
            let mut client = RiroClient::new(ClientConfig::from_env())?;
            client.login(&credential("RIRO_ID")?, &credential("RIRO_PASSWORD")?).await?;

            let info = DbInfo::new(db).with_category(category).with_count(count);
            match kind {
                RecordKind::Board => fetch_live::<BoardItem>(&storage, &client, &info, policy).await?,
                RecordKind::Meal => fetch_live::<MealApplicationItem>(&storage, &client, &info, policy).await?,
                RecordKind::Portfolio => fetch_live::<PortfolioItem>(&storage, &client, &info, policy).await?,
            }
        }
    }

    tracing::info!("Processing finished.");
    Ok(())
}
