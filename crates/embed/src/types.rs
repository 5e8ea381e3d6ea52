use serde::{Deserialize, Serialize};

/// Fixed-dimension embedding vector
pub type Embedding = Vec<f32>;

/// Gemini embedding task hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Text that will be stored and searched
    RetrievalDocument,
    /// Search query text
    RetrievalQuery,
}

/// Gemini `batchEmbedContents` request
#[derive(Debug, Clone, Serialize)]
pub struct BatchEmbedRequest {
    pub requests: Vec<EmbedContentRequest>,
}

/// Single entry of a batch request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    /// Fully qualified model name ("models/gemini-embedding-001")
    pub model: String,

    pub content: Content,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimensionality: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Gemini `batchEmbedContents` response
#[derive(Debug, Clone, Deserialize)]
pub struct BatchEmbedResponse {
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentEmbedding {
    pub values: Vec<f32>,
}

/// Ollama `/api/embed` request
#[derive(Debug, Clone, Serialize)]
pub struct OllamaEmbedRequest {
    pub model: String,

    pub input: Vec<String>,

    /// Truncate output to this many dimensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
}

/// Ollama `/api/embed` response
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaEmbedResponse {
    #[serde(default)]
    pub embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gemini_request_wire_format() {
        let request = BatchEmbedRequest {
            requests: vec![EmbedContentRequest {
                model: "models/gemini-embedding-001".to_string(),
                content: Content::text("hello"),
                task_type: Some(TaskType::RetrievalDocument),
                output_dimensionality: Some(768),
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "requests": [{
                    "model": "models/gemini-embedding-001",
                    "content": {"parts": [{"text": "hello"}]},
                    "taskType": "RETRIEVAL_DOCUMENT",
                    "outputDimensionality": 768
                }]
            })
        );
    }

    #[test]
    fn test_ollama_request_omits_missing_dimensions() {
        let request = OllamaEmbedRequest {
            model: "nomic-embed-text".to_string(),
            input: vec!["a".to_string()],
            dimensions: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("dimensions").is_none());
    }

    #[test]
    fn test_gemini_response_parsing() {
        let body = r#"{"embeddings": [{"values": [0.1, 0.2]}, {"values": [0.3, 0.4]}]}"#;
        let response: BatchEmbedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.embeddings[1].values, vec![0.3, 0.4]);
    }
}
