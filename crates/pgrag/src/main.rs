use anyhow::Result;
use clap::{Parser, Subcommand};
use pgrag::{ingest_document, query, render_results, IngestOptions, DEMO_QUERY};
use pgrag_common::{logger, AppConfig};
use pgrag_document::ChunkConfig;
use pgrag_embed::create_embedder;
use pgrag_vector::{PgVectorStore, VectorStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pgrag")]
#[command(about = "pgrag - embed PDF chunks into Postgres and search them", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, chunk, embed and store a document
    Ingest {
        /// PDF (or .txt/.md) file to ingest
        path: PathBuf,

        /// Maximum chunk length in characters
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Characters shared between consecutive chunks
        #[arg(long)]
        chunk_overlap: Option<usize>,

        /// Keep only the first N chunks
        #[arg(long)]
        max_chunks: Option<usize>,
    },

    /// Embed a query and print the most similar chunks
    Query {
        /// Query text
        text: Option<String>,

        /// Number of results
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Create the vectors table and search_vectors function if missing
    InitSchema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    let level = logger::parse_log_level(&config.log_level)
        .to_string()
        .to_lowercase();
    logger::setup_logging(&config.log_dir, &level)?;

    match cli.command {
        Some(Commands::Ingest {
            path,
            chunk_size,
            chunk_overlap,
            max_chunks,
        }) => {
            if let Some(size) = chunk_size {
                config.chunking.chunk_size = size;
            }
            if let Some(overlap) = chunk_overlap {
                config.chunking.chunk_overlap = overlap;
            }
            config.validate()?;

            let options = IngestOptions {
                chunking: ChunkConfig::from(config.chunking),
                max_chunks,
            };

            let embedder = create_embedder(&config.embedding)?;
            let store = PgVectorStore::connect(&config.database).await?;

            let report = ingest_document(&path, &options, embedder.as_ref(), &store).await?;
            tracing::info!(
                "Stored {} chunks ({} rows in table)",
                report.stored,
                store.count().await?
            );
            println!(
                "Ingested {}: {} pages, {} chunks stored",
                path.display(),
                report.pages,
                report.stored
            );
            store.close().await;
        }
        Some(Commands::Query { text, top_k }) => {
            if let Some(k) = top_k {
                config.top_k = k;
            }
            config.validate()?;
            let text = text.unwrap_or_else(|| DEMO_QUERY.to_string());
            run_query(&config, &text).await?;
        }
        Some(Commands::InitSchema) => {
            let store = PgVectorStore::connect(&config.database).await?;
            store.initialize().await?;
            println!("Schema ready");
            store.close().await;
        }
        None => {
            // Default: fixed demo query against existing rows
            config.validate()?;
            run_query(&config, DEMO_QUERY).await?;
        }
    }

    Ok(())
}

async fn run_query(config: &AppConfig, text: &str) -> Result<()> {
    let embedder = create_embedder(&config.embedding)?;
    let store = PgVectorStore::connect(&config.database).await?;

    let results = query(text, config.top_k, embedder.as_ref(), &store).await?;
    render_results(&results, &mut std::io::stdout().lock())?;

    store.close().await;
    Ok(())
}
