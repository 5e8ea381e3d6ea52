use async_trait::async_trait;
use pgrag_common::{PgragError, Result};
use pgrag_embed::Embedding;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::similarity::l2_norm;
use crate::store::VectorStore;
use crate::types::{Payload, SimilarityResult, StoredRecord};

/// Process-local store ranking by cosine similarity over the stored norms
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    records: RwLock<Vec<StoredRecord>>,
    dimension: Option<usize>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject vectors whose length differs from `dimension`
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            dimension: Some(dimension),
        }
    }

    /// Snapshot of stored rows
    pub async fn records(&self) -> Vec<StoredRecord> {
        self.records.read().await.clone()
    }

    fn check_vector(&self, row: usize, vector: &[f32]) -> Result<()> {
        if let Some(dimension) = self.dimension {
            if vector.len() != dimension {
                return Err(PgragError::data_integrity(format!(
                    "row {}: expected {} dimensions, got {}",
                    row,
                    dimension,
                    vector.len()
                )));
            }
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(PgragError::data_integrity(format!(
                "row {}: vector contains non-finite values",
                row
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn insert_embeddings(&self, vectors: &[Embedding], payloads: &[String]) -> Result<()> {
        if vectors.len() != payloads.len() {
            return Err(PgragError::input_mismatch(vectors.len(), payloads.len()));
        }

        let mut records = self.records.write().await;
        let mut next_id = records.last().map(|r| r.id + 1).unwrap_or(1);

        // Stage every row first so a bad row leaves the store untouched
        let mut staged = Vec::with_capacity(vectors.len());
        for (row, (vector, payload)) in vectors.iter().zip(payloads).enumerate() {
            self.check_vector(row, vector)?;
            staged.push(StoredRecord {
                id: next_id,
                vec: vector.iter().map(|&v| v as f64).collect(),
                norm: l2_norm(vector),
                payload: serde_json::to_value(Payload::new(payload.as_str()))?,
            });
            next_id += 1;
        }

        records.extend(staged);
        info!("Inserted {} vectors into memory store", vectors.len());
        Ok(())
    }

    async fn retrieve_similar(&self, query: &[f32], topk: usize) -> Result<Vec<SimilarityResult>> {
        if topk == 0 {
            return Err(PgragError::invalid_input("topk must be positive"));
        }

        let query_norm = l2_norm(query);
        let records = self.records.read().await;

        let mut results: Vec<SimilarityResult> = records
            .iter()
            .filter(|r| r.vec.len() == query.len())
            .map(|r| {
                let dot: f64 = r.vec.iter().zip(query).map(|(a, &b)| a * b as f64).sum();
                let denom = r.norm * query_norm;
                let similarity = if denom == 0.0 { 0.0 } else { dot / denom };
                SimilarityResult::new(r.id, r.payload.clone(), similarity)
            })
            .collect();

        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(topk);

        debug!(
            "Memory search returned {} results from {} rows",
            results.len(),
            records.len()
        );
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payloads(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_insert_records_norms() {
        let store = InMemoryVectorStore::new();
        store
            .insert_embeddings(&[vec![3.0, 4.0], vec![1.0, 0.0]], &payloads(&["a", "b"]))
            .await
            .unwrap();

        let records = store.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert!((records[0].norm - 5.0).abs() < 1e-9);
        assert_eq!(records[1].payload, serde_json::json!({"content": "b"}));
    }

    #[tokio::test]
    async fn test_length_mismatch_inserts_nothing() {
        let store = InMemoryVectorStore::new();
        let err = store
            .insert_embeddings(&[vec![1.0, 0.0]], &payloads(&["a", "b"]))
            .await
            .unwrap_err();

        assert!(matches!(err, PgragError::InputMismatch { vectors: 1, payloads: 2 }));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bad_row_rolls_back_batch() {
        let store = InMemoryVectorStore::with_dimension(2);
        let err = store
            .insert_embeddings(
                &[vec![1.0, 0.0], vec![1.0, 0.0, 0.0]],
                &payloads(&["ok", "bad"]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PgragError::DataIntegrity(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_topk_bounded_by_rows() {
        let store = InMemoryVectorStore::new();
        store
            .insert_embeddings(
                &[vec![0.0, 1.0], vec![1.0, 1.0], vec![1.0, 0.0]],
                &payloads(&["far", "mid", "near"]),
            )
            .await
            .unwrap();

        let results = store.retrieve_similar(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content(), Some("near"));
        assert!(results
            .windows(2)
            .all(|w| w[0].similarity >= w[1].similarity));
    }

    #[tokio::test]
    async fn test_zero_topk_rejected() {
        let store = InMemoryVectorStore::new();
        assert!(store.retrieve_similar(&[1.0], 0).await.is_err());
    }
}
