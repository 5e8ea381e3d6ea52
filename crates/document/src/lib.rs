//! pgrag document processing
//!
//! Page extraction, normalization and recursive chunking

mod chunking;
mod loader;
mod normalize;

pub use chunking::{chunk_documents, ChunkConfig, RecursiveTextSplitter, DEFAULT_SEPARATORS};
pub use loader::{load_pages, load_pdf_pages, load_text_pages, PAGE_BREAK};
pub use normalize::normalize_documents;
