//! Book Search Main Entry Point
//!
//! Operator commands for the book search index: full reindex, ad-hoc search,
//! index bootstrap and book creation through the normal indexing path.

use std::env;
use std::time::Duration;

use book_search_indexer::{Dependencies, IndexingError, Settings};
use book_search_shared::NewBook;
use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How long `create-book` waits for queued indexing to finish before exiting.
const SYNC_DRAIN_GRACE: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "book-search", version, about = "Book search index operations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index every book in the primary store
    ReindexBooks,
    /// Search books and print the paginated result as JSON
    Search {
        /// Free-text query matched against title, author, description and isbn
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        q: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        per_page: u32,
    },
    /// Create the search index and alias if they do not exist
    EnsureIndex,
    /// Store a new book and index it in the background
    CreateBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        price: f64,
    },
}

/// Initialize tracing/logging.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("book_search_indexer=info,book_search_repository=info")
    });

    let json_logs = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .init();
    }

    info!(
        service_name = "book-search",
        service_version = env!("CARGO_PKG_VERSION"),
        json = json_logs,
        "Tracing initialized"
    );
}

async fn run(command: Command, deps: Dependencies) -> Result<(), IndexingError> {
    match command {
        Command::EnsureIndex => {
            deps.ensure_index().await?;
            println!("Index alias '{}' is ready", deps.settings.index.alias);
        }
        Command::Search { q, page, per_page } => {
            match deps.query_service().query(&q, page, per_page).await {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(e) => {
                    println!("{}", serde_json::to_string_pretty(&e.to_response())?);
                    return Err(e.into());
                }
            }
        }
        Command::ReindexBooks => {
            deps.ensure_index().await?;
            let store = deps.book_store().await?;
            let summary = deps.reindexer(store).reindex_all().await?;

            println!(
                "Books indexed: {}, failed: {}",
                summary.indexed, summary.failed
            );
            if !summary.is_complete() {
                return Err(IndexingError::ReindexPartialFailure {
                    indexed: summary.indexed,
                    failed: summary.failed,
                });
            }
        }
        Command::CreateBook {
            title,
            author,
            description,
            isbn,
            price,
        } => {
            let store = deps.book_store().await?;
            let synchronizer = deps.start_synchronizer();
            let catalog = deps.catalog(store, &synchronizer);

            let created = catalog
                .create_book(NewBook {
                    title,
                    author,
                    description,
                    isbn,
                    price,
                })
                .await;

            let stats = synchronizer.shutdown(SYNC_DRAIN_GRACE).await;
            let record = created?;

            println!("{}", serde_json::to_string_pretty(&record)?);
            info!(
                book_id = record.id,
                indexed = stats.indexed,
                failed = stats.failed,
                dropped = stats.dropped,
                "Create finished"
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    init_tracing();

    let settings = Settings::from_env();

    let deps = match Dependencies::new(settings) {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match run(cli.command, deps).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}
