use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON payload stored next to each vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub content: String,
}

impl Payload {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Row of the `vectors` table
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: i32,

    pub vec: Vec<f64>,

    /// L2 norm of `vec` at insertion time
    pub norm: f64,

    pub payload: Value,
}

/// Search hit, in the order produced by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub id: i32,

    pub payload: Value,

    pub similarity: f64,
}

impl SimilarityResult {
    pub fn new(id: i32, payload: Value, similarity: f64) -> Self {
        Self {
            id,
            payload,
            similarity,
        }
    }

    /// `payload.content` when present
    pub fn content(&self) -> Option<&str> {
        self.payload.get("content").and_then(Value::as_str)
    }
}
