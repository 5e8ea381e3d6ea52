use pgrag_common::{ChunkSettings, PgragError, Result};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Separator preference: paragraph, line, sentence, word, character
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ".", " ", ""];

/// Chunk size limits, measured in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum chunk length
    pub chunk_size: usize,

    /// Characters shared with the previous chunk
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl From<ChunkSettings> for ChunkConfig {
    fn from(settings: ChunkSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        }
    }
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Reject sizes the splitter cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(PgragError::invalid_input("chunk_size must be positive"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(PgragError::invalid_input(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits text at the coarsest separator that yields pieces under the size limit
#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    config: ChunkConfig,
    separators: Vec<String>,
}

impl RecursiveTextSplitter {
    /// Create splitter with the default separator preference
    pub fn new(config: ChunkConfig) -> Self {
        Self {
            config,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the separator preference (coarsest first)
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Split a single document into overlapping chunks
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, finer) = pick_separator(text, separators);
        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.config.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge_pieces(&pending));
                pending.clear();
            }

            if finer.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, finer));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge_pieces(&pending));
        }

        chunks
    }

    /// Greedily pack pieces into chunks, carrying a tail of at most
    /// `chunk_overlap` characters into the next chunk
    fn merge_pieces(&self, pieces: &[String]) -> Vec<String> {
        let ChunkConfig {
            chunk_size,
            chunk_overlap,
        } = self.config;

        let mut merged = Vec::new();
        let mut window: VecDeque<(usize, &str)> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > chunk_size {
                if total > chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, chunk_size
                    );
                }

                if !window.is_empty() {
                    if let Some(chunk) = join_window(&window) {
                        merged.push(chunk);
                    }

                    while total > chunk_overlap || (total + len > chunk_size && total > 0) {
                        match window.pop_front() {
                            Some((dropped, _)) => total -= dropped,
                            None => break,
                        }
                    }
                }
            }

            window.push_back((len, piece.as_str()));
            total += len;
        }

        if let Some(chunk) = join_window(&window) {
            merged.push(chunk);
        }

        merged
    }
}

/// Split every document independently and flatten, keeping document order
pub fn chunk_documents<S: AsRef<str>>(documents: &[S], config: ChunkConfig) -> Vec<String> {
    let splitter = RecursiveTextSplitter::new(config);
    let chunks: Vec<String> = documents
        .iter()
        .flat_map(|doc| splitter.split_text(doc.as_ref()))
        .collect();

    debug!(
        "Chunked {} documents into {} chunks (size={}, overlap={})",
        documents.len(),
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    chunks
}

/// First separator present in the text, plus the finer ones left for recursion.
/// The empty separator always matches.
fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }

    (separators.last().map(String::as_str).unwrap_or(""), &[])
}

/// Split on `separator`, re-attaching it to the start of each following piece
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    text.split(separator)
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_string()
            } else {
                format!("{}{}", separator, part)
            }
        })
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn join_window(window: &VecDeque<(usize, &str)>) -> Option<String> {
    let joined: String = window.iter().map(|(_, piece)| *piece).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
