use pgrag_common::Result;
use pgrag_document::{chunk_documents, load_pages, normalize_documents, ChunkConfig};
use pgrag_embed::Embedder;
use pgrag_vector::{SimilarityResult, VectorStore};
use std::path::Path;
use tracing::{info, warn};

/// Query used when none is given on the command line
pub const DEMO_QUERY: &str = "Usia Pertanggungan";

/// Ingestion options
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    pub chunking: ChunkConfig,

    /// Keep only the first N chunks
    pub max_chunks: Option<usize>,
}

/// Counts produced by one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Raw pages extracted
    pub pages: usize,

    /// Non-empty documents after normalization
    pub documents: usize,

    /// Chunks sent to the embedder
    pub chunks: usize,

    /// Rows written to the store
    pub stored: usize,
}

/// Load a document from disk and store its chunk embeddings
pub async fn ingest_document(
    path: &Path,
    options: &IngestOptions,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
) -> Result<IngestReport> {
    info!("Ingesting {}", path.display());
    let pages = load_pages(path).await?;
    ingest_pages(&pages, options, embedder, store).await
}

/// Normalize, chunk, embed and store already extracted pages
pub async fn ingest_pages(
    pages: &[String],
    options: &IngestOptions,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
) -> Result<IngestReport> {
    options.chunking.validate()?;

    let documents = normalize_documents(pages);
    let mut chunks = chunk_documents(&documents, options.chunking);
    if let Some(limit) = options.max_chunks {
        chunks.truncate(limit);
    }

    let mut report = IngestReport {
        pages: pages.len(),
        documents: documents.len(),
        chunks: chunks.len(),
        stored: 0,
    };

    if chunks.is_empty() {
        warn!("No text to ingest ({} pages, all empty)", pages.len());
        return Ok(report);
    }

    info!(
        "Embedding {} chunks from {} documents with {}",
        chunks.len(),
        documents.len(),
        embedder.model()
    );
    let vectors = embedder.embed_documents(&chunks).await?;

    store.insert_embeddings(&vectors, &chunks).await?;
    report.stored = chunks.len();

    info!("Ingestion completed - {:?}", report);
    Ok(report)
}

/// Embed `text` and return the `topk` closest stored chunks
pub async fn query(
    text: &str,
    topk: usize,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
) -> Result<Vec<SimilarityResult>> {
    info!("Querying top {} for: {}", topk, text);
    let vector = embedder.embed_query(text).await?;
    store.retrieve_similar(&vector, topk).await
}
