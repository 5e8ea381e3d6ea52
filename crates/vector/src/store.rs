use async_trait::async_trait;
use pgrag_common::Result;
use pgrag_embed::Embedding;

use crate::types::SimilarityResult;

/// Insert/retrieve seam over a vector backend.
///
/// The similarity metric belongs to the backend.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store one row per (vector, payload) pair, all or nothing.
    ///
    /// Fails with `InputMismatch` before touching the backend when the
    /// slices differ in length.
    async fn insert_embeddings(&self, vectors: &[Embedding], payloads: &[String]) -> Result<()>;

    /// Up to `topk` rows ordered by descending similarity to `query`
    async fn retrieve_similar(&self, query: &[f32], topk: usize) -> Result<Vec<SimilarityResult>>;

    /// Number of stored rows
    async fn count(&self) -> Result<usize>;
}
