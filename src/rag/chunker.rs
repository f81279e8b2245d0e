//! Recursive character chunking.
//!
//! Documents are split into overlapping windows of at most `chunk_size`
//! characters, preferring to cut at natural boundaries (paragraph, then
//! sentence, then word) and hard-splitting only when none exists. Every
//! chunk records its true character offset in the source text.

use crate::core::errors::ApiError;
use crate::ingest::SourceDocument;

/// Boundary candidates, strongest first. The trailing space/newline of a
/// separator stays with the preceding chunk so offsets remain exact.
const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "! ", "? ", " "];

/// A bounded contiguous substring of a source document, the unit of
/// indexing and retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub title: String,
    /// Character offset of this chunk's first character in the source text.
    pub start_index: usize,
}

#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// `chunk_overlap` must be strictly smaller than `chunk_size`; that is
    /// what guarantees forward progress and termination.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ApiError> {
        if chunk_size == 0 {
            return Err(ApiError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(ApiError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Splits documents in load order; chunks are emitted per document in
    /// document order. Empty input produces empty output.
    pub fn split_documents(&self, documents: &[SourceDocument]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| self.split_text(&doc.text, &doc.title))
            .collect()
    }

    pub fn split_text(&self, text: &str, title: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();

        if total == 0 {
            return chunks;
        }

        let mut start = 0;
        let mut covered = 0;
        loop {
            let window_end = (start + self.chunk_size).min(total);
            let end = if window_end == total {
                // Final remainder chunk, possibly undersized.
                total
            } else {
                // A boundary is only usable if it extends coverage past the
                // previous chunk's end; otherwise hard-split at the window.
                let min_offset = covered - start;
                find_boundary(&chars[start..window_end], min_offset)
                    .map(|offset| start + offset)
                    .unwrap_or(window_end)
            };
            covered = end;

            chunks.push(Chunk {
                text: chars[start..end].iter().collect(),
                title: title.to_string(),
                start_index: start,
            });

            if end >= total {
                break;
            }

            let len = end - start;
            let next = if len > self.chunk_overlap {
                start + (len - self.chunk_overlap)
            } else {
                // A chunk shorter than the overlap advances past itself.
                end
            };
            debug_assert!(next > start, "chunking must make forward progress");
            start = next;
        }

        chunks
    }
}

/// Offset just past the strongest boundary in the window, if it lies
/// beyond `min_offset`.
fn find_boundary(window: &[char], min_offset: usize) -> Option<usize> {
    for sep in SEPARATORS {
        let needle: Vec<char> = sep.chars().collect();
        if let Some(pos) = rfind(window, &needle) {
            let end = pos + needle.len();
            if end > min_offset {
                return Some(end);
            }
        }
    }
    None
}

fn rfind(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .rev()
        .find(|&i| haystack[i..i + needle.len()] == *needle)
}
