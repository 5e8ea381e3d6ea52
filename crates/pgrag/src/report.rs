use pgrag_vector::SimilarityResult;
use std::io::{self, Write};

/// Print ranked results: rank and score line, payload content, blank line
pub fn render_results<W: Write>(results: &[SimilarityResult], out: &mut W) -> io::Result<()> {
    for (rank, result) in results.iter().enumerate() {
        writeln!(out, "Rank {} - Score: {:.3}", rank + 1, result.similarity)?;
        match result.content() {
            Some(content) => writeln!(out, "{}", content)?,
            // Rows written by other tools may lack `content`
            None => writeln!(out, "{}", result.payload)?,
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_results() {
        let results = vec![
            SimilarityResult::new(7, json!({"content": "cat"}), 0.98765),
            SimilarityResult::new(3, json!({"content": "dog"}), 0.1),
        ];

        let mut out = Vec::new();
        render_results(&results, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Rank 1 - Score: 0.988\ncat\n\nRank 2 - Score: 0.100\ndog\n\n"
        );
    }

    #[test]
    fn test_render_payload_without_content() {
        let results = vec![SimilarityResult::new(1, json!({"title": "x"}), 0.5)];
        let mut out = Vec::new();
        render_results(&results, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Rank 1 - Score: 0.500\n{\"title\":\"x\"}\n\n"
        );
    }

    #[test]
    fn test_render_empty() {
        let mut out = Vec::new();
        render_results(&[], &mut out).unwrap();
        assert!(out.is_empty());
    }
}
