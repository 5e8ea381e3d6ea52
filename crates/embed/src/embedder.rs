use async_trait::async_trait;
use pgrag_common::{EmbeddingConfig, EmbeddingProvider, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::gemini::GeminiClient;
use crate::ollama::OllamaClient;
use crate::types::Embedding;

/// Common trait for embedding backends
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed texts for storage; one vector per input, same order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a single search query
    async fn embed_query(&self, text: &str) -> Result<Embedding>;

    /// Model identifier
    fn model(&self) -> &str;

    /// Requested output dimensionality
    fn dimension(&self) -> usize;
}

/// Build the embedder selected by configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.provider {
        EmbeddingProvider::Gemini => Arc::new(GeminiClient::new(config)?),
        EmbeddingProvider::Ollama => Arc::new(OllamaClient::new(config)?),
    };
    Ok(embedder)
}

/// Run `operation` up to `max_attempts` times with exponential backoff
pub(crate) async fn with_retry<T, F, Fut>(label: &str, max_attempts: u32, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                let delay = Duration::from_secs(2u64.pow(attempt - 1));
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                    label, attempt, max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgrag_common::PgragError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_single_attempt_does_not_retry() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry("test", 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(PgragError::embedding("down")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry("test", 3, || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(PgragError::embedding("flaky"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_create_embedder_by_provider() {
        let mut config = EmbeddingConfig::default();
        config.api_key = Some("key".to_string());
        let gemini = create_embedder(&config).unwrap();
        assert_eq!(gemini.model(), "gemini-embedding-001");
        assert_eq!(gemini.dimension(), 768);

        config.provider = EmbeddingProvider::Ollama;
        config.model = "nomic-embed-text".to_string();
        config.base_url = "http://localhost:11434".to_string();
        let ollama = create_embedder(&config).unwrap();
        assert_eq!(ollama.model(), "nomic-embed-text");
    }
}
