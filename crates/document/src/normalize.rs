/// Strip surrounding whitespace and drop empty documents, keeping order
pub fn normalize_documents<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
