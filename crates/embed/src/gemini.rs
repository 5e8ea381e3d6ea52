use async_trait::async_trait;
use pgrag_common::{EmbeddingConfig, PgragError, Result};
use reqwest::Client;
use tracing::{debug, info};

use crate::embedder::{with_retry, Embedder};
use crate::types::{
    BatchEmbedRequest, BatchEmbedResponse, Content, EmbedContentRequest, Embedding, TaskType,
};

/// Gemini embedding API client (`batchEmbedContents`)
#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
    batch_size: usize,
    max_retries: u32,
    client: Client,
}

impl GeminiClient {
    /// Create new Gemini client
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PgragError::config("GOOGLE_API_KEY is required for Gemini embeddings"))?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        let model = config
            .model
            .strip_prefix("models/")
            .unwrap_or(&config.model)
            .to_string();

        info!("Gemini embedding client initialized: {} ({} dims)", model, config.dimension);
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:batchEmbedContents", self.base_url, self.model)
    }

    fn build_request(&self, texts: &[String], task_type: TaskType) -> BatchEmbedRequest {
        BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: format!("models/{}", self.model),
                    content: Content::text(text.as_str()),
                    task_type: Some(task_type),
                    output_dimensionality: Some(self.dimension),
                })
                .collect(),
        }
    }

    /// Embed texts in `batch_size` slices, one HTTP request per slice
    async fn embed_batched(&self, texts: &[String], task_type: TaskType) -> Result<Vec<Embedding>> {
        let url = self.endpoint();
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let request = self.build_request(batch, task_type);
            debug!(
                "Sending embedding batch to Gemini - Model: {}, Texts: {}",
                self.model,
                batch.len()
            );

            let vectors = with_retry("Gemini embedding request", self.max_retries, || {
                self.try_embed(&url, &request)
            })
            .await?;
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }

    /// Single attempt for one batch
    async fn try_embed(&self, url: &str, request: &BatchEmbedRequest) -> Result<Vec<Embedding>> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| PgragError::embedding(format!("Failed to reach Gemini API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PgragError::embedding(format!(
                "Gemini API returned {}: {}",
                status,
                body.trim()
            )));
        }

        let result: BatchEmbedResponse = response.json().await.map_err(|e| {
            PgragError::embedding(format!("Failed to parse Gemini response: {}", e))
        })?;

        Ok(result.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.embed_batched(texts, TaskType::RetrievalDocument).await?;
        info!("Embedded {} texts with {}", embeddings.len(), self.model);
        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Embedding> {
        self.embed_batched(&[text.to_string()], TaskType::RetrievalQuery)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PgragError::embedding("Empty embedding response from Gemini"))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const PATH: &str = "/v1beta/models/gemini-embedding-001:batchEmbedContents";

    fn config(base_url: String, batch_size: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            dimension: 3,
            batch_size,
            ..EmbeddingConfig::default()
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_embed_documents_batches_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "requests": [
                    {"taskType": "RETRIEVAL_DOCUMENT", "outputDimensionality": 3},
                    {"taskType": "RETRIEVAL_DOCUMENT", "outputDimensionality": 3}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embeddings": [{"values": [1.0, 0.0, 0.0]}, {"values": [0.0, 1.0, 0.0]}]}"#)
            .expect(2)
            .create_async()
            .await;

        let client = GeminiClient::new(&config(server.url(), 2)).unwrap();
        let vectors = client
            .embed_documents(&texts(&["a", "b", "c", "d"]))
            .await
            .unwrap();

        assert_eq!(vectors.len(), 4);
        assert_eq!(vectors[2], vec![1.0, 0.0, 0.0]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_embed_query_uses_query_task() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_body(Matcher::PartialJson(json!({
                "requests": [{
                    "model": "models/gemini-embedding-001",
                    "content": {"parts": [{"text": "Usia Pertanggungan"}]},
                    "taskType": "RETRIEVAL_QUERY"
                }]
            })))
            .with_status(200)
            .with_body(r#"{"embeddings": [{"values": [0.5, 0.5, 0.0]}]}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(&config(server.url(), 100)).unwrap();
        let vector = client.embed_query("Usia Pertanggungan").await.unwrap();

        assert_eq!(vector, vec![0.5, 0.5, 0.0]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_model_is_embedding_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(404)
            .with_body(r#"{"error": {"message": "model not found"}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(&config(server.url(), 100)).unwrap();
        let err = client.embed_documents(&texts(&["a"])).await.unwrap_err();

        assert!(matches!(err, PgragError::Embedding(_)));
        assert!(err.to_string().contains("model not found"));
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let client = GeminiClient::new(&config("http://127.0.0.1:9".to_string(), 100)).unwrap();
        assert!(client.embed_documents(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let client = GeminiClient::new(&config("http://127.0.0.1:9".to_string(), 100)).unwrap();
        let err = client.embed_query("hello").await.unwrap_err();
        assert!(matches!(err, PgragError::Embedding(_)));
    }

    #[test]
    fn test_missing_api_key() {
        let mut cfg = EmbeddingConfig::default();
        cfg.api_key = None;
        assert!(matches!(GeminiClient::new(&cfg), Err(PgragError::Config(_))));
    }

    #[test]
    fn test_model_prefix_normalized() {
        let mut cfg = config("https://example.com/".to_string(), 10);
        cfg.model = "models/text-embedding-004".to_string();
        let client = GeminiClient::new(&cfg).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.com/v1beta/models/text-embedding-004:batchEmbedContents"
        );
    }
}
