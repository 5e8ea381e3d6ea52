//! pgrag use cases
//!
//! Document ingestion and similarity queries over pluggable embedders and
//! vector stores

pub mod report;
pub mod workflow;

pub use report::render_results;
pub use workflow::{ingest_document, ingest_pages, query, IngestOptions, IngestReport, DEMO_QUERY};
