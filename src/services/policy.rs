//! In-memory policy document store
//!
//! Uploaded policy documents are split into overlapping chunks and indexed
//! for lexical retrieval: chunks sharing the most terms with a question rank
//! first. Everything lives in memory; the store dies with the process.

use crate::error::AppError;
use std::path::Path;
use tracing::info;

/// Maximum chunk length in characters
pub const CHUNK_SIZE: usize = 500;
/// Characters of the previous chunk repeated at the start of the next
pub const CHUNK_OVERLAP: usize = 50;
/// How many chunks retrieval returns by default
pub const RETRIEVAL_TOP_K: usize = 4;

/// File extensions accepted for upload
const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// A retrievable slice of an indexed document
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyChunk {
    /// Name of the document the chunk came from
    pub source: String,
    /// Chunk text
    pub text: String,
}

/// The in-memory policy index
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    chunks: Vec<PolicyChunk>,
}

impl PolicyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any document has been indexed
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of indexed chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Index a document, replacing any earlier upload with the same name
    ///
    /// Returns the number of chunks indexed for the document.
    pub fn ingest(&mut self, source: &str, text: &str) -> usize {
        self.chunks.retain(|chunk| chunk.source != source);

        let pieces = split_into_chunks(text, CHUNK_SIZE, CHUNK_OVERLAP);
        let count = pieces.len();
        for text in pieces {
            self.chunks.push(PolicyChunk {
                source: source.to_string(),
                text,
            });
        }

        info!(source = %source, chunks = count, "Indexed policy document");
        count
    }

    /// Index a document from disk
    ///
    /// # Errors
    /// * `AppError::UnsupportedFileType` for anything but `.txt`/`.md`
    /// * `AppError::Internal` if the file cannot be read
    pub fn ingest_path(&mut self, path: &Path) -> Result<usize, AppError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        validate_extension(&name)?;

        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to read {name}: {e}")))?;
        Ok(self.ingest(&name, &text))
    }

    /// Index every supported document in a directory
    ///
    /// Unsupported files are skipped silently; returns the number of
    /// documents indexed.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, AppError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("failed to read {}: {e}", dir.display()))
        })?;

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && self.ingest_path(&path).is_ok() {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// The chunks most relevant to a question, best first
    ///
    /// Relevance is the number of question terms a chunk contains; ties keep
    /// document order. Always returns up to `k` chunks when the store is
    /// non-empty, even if nothing overlaps.
    pub fn retrieve(&self, question: &str, k: usize) -> Vec<&PolicyChunk> {
        let terms = query_terms(question);

        let mut scored: Vec<(usize, &PolicyChunk)> = self
            .chunks
            .iter()
            .map(|chunk| {
                let haystack = chunk.text.to_lowercase();
                let score = terms
                    .iter()
                    .filter(|term| haystack.contains(term.as_str()))
                    .count();
                (score, chunk)
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(k).map(|(_, chunk)| chunk).collect()
    }
}

/// Check that a file name has a supported extension
pub fn validate_extension(name: &str) -> Result<(), AppError> {
    let extension = name.rsplit('.').next().unwrap_or_default().to_lowercase();
    if name.contains('.') && SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(AppError::UnsupportedFileType(name.to_string()))
    }
}

/// Split text into chunks of at most `size` characters
///
/// Cuts at whitespace where possible and repeats up to `overlap` characters
/// of the previous chunk so sentences spanning a boundary stay answerable.
pub fn split_into_chunks(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.trim().chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());

        // Prefer a whitespace boundary unless this is the final chunk
        let mut cut = end;
        if end < chars.len() {
            if let Some(ws) = (start + 1..end).rev().find(|&i| chars[i].is_whitespace()) {
                cut = ws;
            }
        }

        let piece: String = chars[start..cut].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if cut >= chars.len() {
            break;
        }
        start = cut.saturating_sub(overlap).max(start + 1);
    }
    chunks
}

/// Lowercased terms of a question worth matching on
fn query_terms(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| term.len() >= 3)
        .map(String::from)
        .collect()
}
