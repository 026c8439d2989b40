//! Recursive character chunking
//!
//! Splits document text into overlapping chunks, preferring paragraph
//! boundaries, then line breaks, then sentence ends, then spaces, falling
//! back to a hard character cut. Chunk boundaries are byte-safe for UTF-8
//! because every split point comes from a separator match or char boundary.

/// Chunking configuration
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Recursive character splitter
#[derive(Debug, Clone, Default)]
pub struct RecursiveChunker {
    config: ChunkerConfig,
}

const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " "];

impl RecursiveChunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Split text into chunks, trimmed and non-empty, each ending in
    /// terminal punctuation.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        self.split_recursive(text, 0, &mut pieces);
        let merged = self.merge_with_overlap(&pieces);

        merged
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .map(|mut c| {
                if !c.ends_with(['.', '!', '?']) {
                    c.push('.');
                }
                c
            })
            .collect()
    }

    /// Break text into fragments no longer than chunk_size, trying each
    /// separator in turn.
    fn split_recursive(&self, text: &str, sep_idx: usize, out: &mut Vec<String>) {
        if text.chars().count() <= self.config.chunk_size {
            if !text.trim().is_empty() {
                out.push(text.to_string());
            }
            return;
        }

        if sep_idx >= SEPARATORS.len() {
            // Hard cut on char boundaries
            let chars: Vec<char> = text.chars().collect();
            for window in chars.chunks(self.config.chunk_size) {
                let piece: String = window.iter().collect();
                if !piece.trim().is_empty() {
                    out.push(piece);
                }
            }
            return;
        }

        let sep = SEPARATORS[sep_idx];
        let parts: Vec<&str> = text.split(sep).collect();
        if parts.len() == 1 {
            self.split_recursive(text, sep_idx + 1, out);
            return;
        }

        for part in parts {
            self.split_recursive(part, sep_idx + 1, out);
        }
    }

    /// Greedily pack fragments into chunks up to chunk_size, carrying the
    /// configured overlap between consecutive chunks.
    fn merge_with_overlap(&self, pieces: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for piece in pieces {
            let piece_len = piece.chars().count();
            if current_len > 0 && current_len + piece_len + 1 > self.config.chunk_size {
                let tail = overlap_tail(&current, self.config.chunk_overlap);
                chunks.push(std::mem::take(&mut current));
                current = tail;
                current_len = current.chars().count();
            }
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(piece.trim());
            current_len += piece_len;
        }

        if !current.trim().is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

/// Last `overlap` characters of a chunk, snapped back to a word boundary
fn overlap_tail(text: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= overlap {
        return text.to_string();
    }
    let tail: String = chars[chars.len() - overlap..].iter().collect();
    match tail.find(' ') {
        Some(pos) => tail[pos + 1..].to_string(),
        None => tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = RecursiveChunker::default();
        let chunks = chunker.chunk("A short paragraph that fits in one chunk.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "A short paragraph that fits in one chunk.");
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let chunker = RecursiveChunker::default();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\n  ").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let chunker = RecursiveChunker::new(ChunkerConfig {
            chunk_size: 100,
            chunk_overlap: 10,
        });
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let text = sentence.repeat(20);
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            // +1 slack for the punctuation appended during post-processing
            assert!(chunk.chars().count() <= 101, "oversized chunk: {}", chunk);
        }
    }

    #[test]
    fn test_terminal_punctuation_added() {
        let chunker = RecursiveChunker::default();
        let chunks = chunker.chunk("no punctuation here");
        assert_eq!(chunks[0], "no punctuation here.");
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let chunker = RecursiveChunker::new(ChunkerConfig {
            chunk_size: 80,
            chunk_overlap: 20,
        });
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa \
                    lambda mu nu xi omicron pi rho sigma tau upsilon phi chi psi omega";
        let chunks = chunker.chunk(text);
        assert!(chunks.len() > 1);
        // The second chunk starts with words repeated from the first
        let first_words: Vec<&str> = chunks[0].split_whitespace().collect();
        let second_first = chunks[1].split_whitespace().next().unwrap();
        assert!(first_words.contains(&second_first));
    }

    #[test]
    fn test_paragraphs_preferred_over_hard_cuts() {
        let chunker = RecursiveChunker::new(ChunkerConfig {
            chunk_size: 60,
            chunk_overlap: 0,
        });
        let text = "First paragraph with its own topic here.\n\nSecond paragraph on something else entirely.";
        let chunks = chunker.chunk(text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("First paragraph"));
        assert!(chunks[1].starts_with("Second paragraph"));
    }
}
