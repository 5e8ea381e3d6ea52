use async_trait::async_trait;
use pgrag_common::{DatabaseConfig, PgragError, Result};
use pgrag_embed::Embedding;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info};

use crate::similarity::l2_norm;
use crate::store::VectorStore;
use crate::types::{Payload, SimilarityResult};

/// Bundled schema for `vectors` and `search_vectors`
pub const SCHEMA_SQL: &str = include_str!("../schema.sql");

const INSERT_SQL: &str = "INSERT INTO vectors (vec, norm, payload) VALUES ($1, $2, $3)";

const SEARCH_SQL: &str =
    "SELECT id, payload, similarity FROM search_vectors($1::float8[], $2)";

/// Vector store client over the `vectors` table.
///
/// Ranking is done by the database-side `search_vectors` function; this
/// client only forwards the query vector and the limit.
#[derive(Debug, Clone)]
pub struct PgVectorStore {
    pool: PgPool,
}

impl PgVectorStore {
    /// Open the connection pool described by `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.dbname)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| {
                PgragError::database(format!(
                    "Failed to connect to {}:{}/{}: {}",
                    config.host, config.port, config.dbname, e
                ))
            })?;

        info!(
            "Connected to Postgres at {}:{}/{}",
            config.host, config.port, config.dbname
        );
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the table and search function if they do not exist
    pub async fn initialize(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("schema setup", e))?;

        info!("Vector schema ready");
        Ok(())
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn insert_embeddings(&self, vectors: &[Embedding], payloads: &[String]) -> Result<()> {
        if vectors.len() != payloads.len() {
            return Err(PgragError::input_mismatch(vectors.len(), payloads.len()));
        }

        // Dropping `tx` without commit rolls back every row of this call
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("begin transaction", e))?;

        for (row, (vector, payload)) in vectors.iter().zip(payloads).enumerate() {
            let norm = l2_norm(vector);
            let vec: Vec<f64> = vector.iter().map(|&v| v as f64).collect();
            let payload = serde_json::to_value(Payload::new(payload.as_str()))?;

            sqlx::query(INSERT_SQL)
                .bind(vec)
                .bind(norm)
                .bind(payload)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_db_error(&format!("insert row {}", row), e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_db_error("commit", e))?;

        info!("Inserted {} vectors", vectors.len());
        Ok(())
    }

    async fn retrieve_similar(&self, query: &[f32], topk: usize) -> Result<Vec<SimilarityResult>> {
        if topk == 0 {
            return Err(PgragError::invalid_input("topk must be positive"));
        }
        let limit = i32::try_from(topk)
            .map_err(|_| PgragError::invalid_input(format!("topk {} out of range", topk)))?;

        let query: Vec<f64> = query.iter().map(|&v| v as f64).collect();
        debug!("Calling search_vectors (dims={}, topk={})", query.len(), limit);

        let rows: Vec<(i32, Value, f64)> = sqlx::query_as(SEARCH_SQL)
            .bind(query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("search_vectors", e))?;

        let results: Vec<SimilarityResult> = rows
            .into_iter()
            .map(|(id, payload, similarity)| SimilarityResult::new(id, payload, similarity))
            .collect();

        info!("Search completed - {} results", results.len());
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vectors")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("count", e))?;
        Ok(count.max(0) as usize)
    }
}

/// SQLSTATE classes 22 (data exception) and 23 (integrity constraint
/// violation) are data problems; everything else is a database failure
fn map_db_error(context: &str, err: sqlx::Error) -> PgragError {
    let is_data_error = match &err {
        sqlx::Error::Database(db) => db
            .code()
            .map(|code| code.starts_with("22") || code.starts_with("23"))
            .unwrap_or(false),
        _ => false,
    };

    if is_data_error {
        PgragError::data_integrity(format!("{}: {}", context, err))
    } else {
        PgragError::database(format!("{}: {}", context, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_defines_table_and_function() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS vectors"));
        assert!(SCHEMA_SQL.contains("search_vectors(query float8[], topk integer)"));
    }

    #[test]
    fn test_non_database_errors_map_to_database() {
        let err = map_db_error("search_vectors", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, PgragError::Database(_)));
        assert!(err.to_string().contains("search_vectors"));
    }

    #[tokio::test]
    async fn test_mismatch_rejected_before_database() {
        // Lazy pool never connects; the length check must fire first
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:9/none")
            .unwrap();
        let store = PgVectorStore::from_pool(pool);

        let err = store
            .insert_embeddings(&[vec![1.0, 0.0]], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PgragError::InputMismatch { vectors: 1, payloads: 0 }));
    }

    #[tokio::test]
    async fn test_zero_topk_rejected_before_database() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:9/none")
            .unwrap();
        let store = PgVectorStore::from_pool(pool);

        let err = store.retrieve_similar(&[1.0], 0).await.unwrap_err();
        assert!(matches!(err, PgragError::InvalidInput(_)));
    }
}
