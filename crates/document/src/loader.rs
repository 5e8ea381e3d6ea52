use pgrag_common::{PgragError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Page separator emitted by the PDF text extractor
pub const PAGE_BREAK: char = '\x0c';

/// Load raw page texts from a document, choosing the reader by extension.
///
/// `.pdf` goes through the PDF extractor; `.txt` and `.md` are read as text
/// with form feeds treated as page breaks.
pub async fn load_pages(path: &Path) -> Result<Vec<String>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => load_pdf_pages(path).await,
        "txt" | "md" => load_text_pages(path).await,
        other => Err(PgragError::document(format!(
            "Unsupported document type '{}': {}",
            other,
            path.display()
        ))),
    }
}

/// Extract one raw text block per PDF page
pub async fn load_pdf_pages(path: &Path) -> Result<Vec<String>> {
    ensure_exists(path)?;

    let owned: PathBuf = path.to_path_buf();
    // pdf_extract is synchronous
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
        .await
        .map_err(|e| anyhow::anyhow!("PDF extraction task failed: {}", e))?
        .map_err(|e| {
            PgragError::document(format!(
                "Failed to extract text from {}: {}",
                path.display(),
                e
            ))
        })?;

    let pages = split_pages(&text);
    info!("Loaded {} pages from {}", pages.len(), path.display());
    Ok(pages)
}

/// Read a plain text file as pages
pub async fn load_text_pages(path: &Path) -> Result<Vec<String>> {
    ensure_exists(path)?;

    let text = tokio::fs::read_to_string(path).await?;
    let pages = split_pages(&text);
    debug!("Loaded {} text pages from {}", pages.len(), path.display());
    Ok(pages)
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PgragError::document(format!(
            "Document not found: {}",
            path.display()
        )));
    }
    Ok(())
}

fn split_pages(text: &str) -> Vec<String> {
    text.split(PAGE_BREAK).map(|page| page.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_pages_keeps_empty_pages() {
        let pages = split_pages("one\x0c\x0cthree\x0c");
        assert_eq!(pages, vec!["one", "", "three", ""]);
    }

    #[tokio::test]
    async fn test_load_text_pages() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "page one\x0cpage two").unwrap();

        let pages = load_pages(file.path()).await.unwrap();
        assert_eq!(pages, vec!["page one", "page two"]);
    }

    #[tokio::test]
    async fn test_missing_pdf() {
        let err = load_pdf_pages(Path::new("/nonexistent/brochure.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, PgragError::Document(_)));
    }

    #[tokio::test]
    async fn test_invalid_pdf() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        write!(file, "definitely not a pdf").unwrap();

        let result = load_pages(file.path()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        let err = load_pages(file.path()).await.unwrap_err();
        assert!(matches!(err, PgragError::Document(_)));
    }
}
