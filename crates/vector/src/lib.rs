//! pgrag vector storage
//!
//! Postgres-backed store delegating ranking to `search_vectors`, plus an
//! in-memory store with cosine ranking

mod memory;
mod postgres;
mod similarity;
mod store;
mod types;

pub use memory::InMemoryVectorStore;
pub use postgres::{PgVectorStore, SCHEMA_SQL};
pub use similarity::l2_norm;
pub use store::VectorStore;
pub use types::{Payload, SimilarityResult, StoredRecord};
