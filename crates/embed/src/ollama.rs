use async_trait::async_trait;
use pgrag_common::{EmbeddingConfig, PgragError, Result};
use reqwest::Client;
use tracing::{debug, info};

use crate::embedder::{with_retry, Embedder};
use crate::types::{Embedding, OllamaEmbedRequest, OllamaEmbedResponse};

/// Ollama embedding client (`/api/embed`)
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    dimension: usize,
    batch_size: usize,
    max_retries: u32,
    client: Client,
}

impl OllamaClient {
    /// Create new Ollama client
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        info!("Ollama client initialized: {}", config.base_url);
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
            client,
        })
    }

    async fn embed_batched(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let url = format!("{}/api/embed", self.base_url);
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let request = OllamaEmbedRequest {
                model: self.model.clone(),
                input: batch.to_vec(),
                dimensions: Some(self.dimension),
            };
            debug!("Generating embeddings - Model: {}, Texts: {}", self.model, batch.len());

            let vectors = with_retry("Ollama embedding request", self.max_retries, || {
                self.try_embed(&url, &request)
            })
            .await?;
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }

    /// Single attempt to generate embeddings
    async fn try_embed(&self, url: &str, request: &OllamaEmbedRequest) -> Result<Vec<Embedding>> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| PgragError::embedding(format!("Failed to send embedding request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PgragError::embedding(format!(
                "Ollama embedding API returned {}: {}",
                status,
                body.trim()
            )));
        }

        let result: OllamaEmbedResponse = response.json().await.map_err(|e| {
            PgragError::embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        Ok(result.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed_batched(texts).await
    }

    async fn embed_query(&self, text: &str) -> Result<Embedding> {
        self.embed_batched(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PgragError::embedding("Empty embedding from Ollama"))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
