/// pgrag error types
#[derive(Debug, thiserror::Error)]
pub enum PgragError {
    /// Vectors and payloads handed to the store differ in length
    #[error("Input mismatch: {vectors} vectors but {payloads} payloads")]
    InputMismatch { vectors: usize, payloads: usize },

    /// Embedding service error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Data rejected by the database (bad vector, constraint violation)
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Document loading error
    #[error("Document error: {0}")]
    Document(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PgragError {
    /// Create input mismatch error
    pub fn input_mismatch(vectors: usize, payloads: usize) -> Self {
        Self::InputMismatch { vectors, payloads }
    }

    /// Create embedding error
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create database error
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create data integrity error
    pub fn data_integrity<S: Into<String>>(msg: S) -> Self {
        Self::DataIntegrity(msg.into())
    }

    /// Create document error
    pub fn document<S: Into<String>>(msg: S) -> Self {
        Self::Document(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}
