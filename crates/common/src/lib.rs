pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, ChunkSettings, DatabaseConfig, EmbeddingConfig, EmbeddingProvider};
pub use error::PgragError;
pub type Result<T> = std::result::Result<T, PgragError>;
