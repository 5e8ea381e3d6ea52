//! pgrag embedding clients
//!
//! Gemini and Ollama embedding APIs behind a common `Embedder` trait

mod embedder;
mod gemini;
mod ollama;
mod types;

pub use embedder::{create_embedder, Embedder};
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use types::{
    BatchEmbedRequest, BatchEmbedResponse, Content, ContentEmbedding, EmbedContentRequest,
    Embedding, OllamaEmbedRequest, OllamaEmbedResponse, Part, TaskType,
};
