use crate::error::PgragError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Default Gemini API endpoint
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Ollama API endpoint
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Postgres connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Pool size; a single connection per run unless raised
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "mydb".to_string(),
            user: "root".to_string(),
            password: "password".to_string(),
            max_connections: 1,
        }
    }
}

/// Embedding backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Gemini,
    Ollama,
}

impl EmbeddingProvider {
    /// Parse provider name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self, PgragError> {
        match name.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(PgragError::config(format!(
                "Unknown embedding provider '{}' (expected gemini or ollama)",
                other
            ))),
        }
    }

    /// Default API base URL for this provider
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => GEMINI_BASE_URL,
            Self::Ollama => OLLAMA_BASE_URL,
        }
    }
}

/// Embedding API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,

    /// Model identifier (e.g., "gemini-embedding-001")
    pub model: String,

    /// Output dimensionality
    pub dimension: usize,

    /// API base URL
    pub base_url: String,

    /// API key (Gemini only)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Texts per request
    pub batch_size: usize,

    /// Attempts per request; 1 means no retry
    pub max_retries: u32,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Gemini,
            model: "gemini-embedding-001".to_string(),
            dimension: 768,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: None,
            batch_size: 100,
            max_retries: 1,
            timeout_secs: 60,
        }
    }
}

/// Chunking defaults
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// pgrag application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,

    pub embedding: EmbeddingConfig,

    pub chunking: ChunkSettings,

    /// Number of results returned by a query
    pub top_k: usize,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            embedding: EmbeddingConfig::default(),
            chunking: ChunkSettings::default(),
            top_k: 5,
            log_dir: PathBuf::from("./log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, PgragError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self, PgragError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let provider = match var("EMBEDDING_PROVIDER") {
            Some(name) => EmbeddingProvider::parse(&name)?,
            None => defaults.embedding.provider,
        };

        let model = var("EMBEDDING_MODEL").unwrap_or_else(|| match provider {
            EmbeddingProvider::Gemini => defaults.embedding.model.clone(),
            EmbeddingProvider::Ollama => "nomic-embed-text".to_string(),
        });

        let database = DatabaseConfig {
            host: var("PGHOST").unwrap_or(defaults.database.host),
            port: parse_or(&var, "PGPORT", defaults.database.port)?,
            dbname: var("PGDATABASE").unwrap_or(defaults.database.dbname),
            user: var("PGUSER").unwrap_or(defaults.database.user),
            password: var("PGPASSWORD").unwrap_or(defaults.database.password),
            max_connections: parse_or(
                &var,
                "DB_MAX_CONNECTIONS",
                defaults.database.max_connections,
            )?,
        };

        let embedding = EmbeddingConfig {
            provider,
            model,
            dimension: parse_or(&var, "EMBEDDING_DIMENSION", defaults.embedding.dimension)?,
            base_url: var("EMBEDDING_BASE_URL")
                .unwrap_or_else(|| provider.default_base_url().to_string()),
            api_key: var("GOOGLE_API_KEY").filter(|k| !k.trim().is_empty()),
            batch_size: parse_or(&var, "EMBEDDING_BATCH_SIZE", defaults.embedding.batch_size)?,
            max_retries: parse_or(&var, "EMBEDDING_MAX_RETRIES", defaults.embedding.max_retries)?,
            timeout_secs: parse_or(
                &var,
                "EMBEDDING_TIMEOUT_SECS",
                defaults.embedding.timeout_secs,
            )?,
        };

        let chunking = ChunkSettings {
            chunk_size: parse_or(&var, "CHUNK_SIZE", defaults.chunking.chunk_size)?,
            chunk_overlap: parse_or(&var, "CHUNK_OVERLAP", defaults.chunking.chunk_overlap)?,
        };

        Ok(Self {
            database,
            embedding,
            chunking,
            top_k: parse_or(&var, "SEARCH_TOP_K", defaults.top_k)?,
            log_dir: var("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), PgragError> {
        if self.database.port == 0 {
            return Err(PgragError::config("Database port cannot be 0"));
        }

        if self.database.max_connections == 0 {
            return Err(PgragError::config("DB_MAX_CONNECTIONS must be at least 1"));
        }

        if !self.embedding.base_url.starts_with("http://")
            && !self.embedding.base_url.starts_with("https://")
        {
            return Err(PgragError::config(
                "Embedding base URL must start with http:// or https://",
            ));
        }

        if self.embedding.model.is_empty() {
            return Err(PgragError::config("Embedding model name cannot be empty"));
        }

        if self.embedding.dimension == 0 {
            return Err(PgragError::config("Embedding dimension cannot be 0"));
        }

        if self.embedding.batch_size == 0 {
            return Err(PgragError::config("Embedding batch size cannot be 0"));
        }

        if self.embedding.provider == EmbeddingProvider::Gemini && self.embedding.api_key.is_none() {
            return Err(PgragError::config(
                "GOOGLE_API_KEY must be set for the gemini embedding provider",
            ));
        }

        if self.top_k == 0 {
            return Err(PgragError::config("SEARCH_TOP_K cannot be 0"));
        }

        Ok(())
    }
}

/// Parse a numeric variable into its target type; unset means default
fn parse_or<F, T>(var: &F, key: &str, default: T) -> Result<T, PgragError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            PgragError::config(format!("Invalid value '{}' for {}: {}", raw, key, e))
        }),
        None => Ok(default),
    }
}
