//! Document chunking: header-aware pre-splitting plus bounded-size splitting
//! with overlap.
//!
//! Markdown documents are first cut at heading lines, with the heading path
//! (`header1`..`header3`) recorded in chunk metadata. Every text unit is
//! then split to a character bound, preferring structural separators in
//! priority order (top-level heading, second-level heading, paragraph
//! break, line break, word break) and falling back to a character split
//! only when nothing coarser fits. Consecutive chunks from the same source
//! overlap by a configured number of characters so context at a boundary is
//! not lost.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::{Document, Metadata};

/// Boundary separators in priority order. A finer separator is used only
/// when a unit still exceeds the size bound after the coarser one.
const SEPARATORS: &[&str] = &["\n# ", "\n## ", "\n\n", "\n", " "];

/// Size bounds for the splitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Maximum characters per chunk.
    pub max_chars: usize,
    /// Characters shared between consecutive chunks of one source.
    pub overlap: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_chars: 500,
            overlap: 50,
        }
    }
}

/// Splits documents into bounded, overlapping chunks.
pub struct TextSplitter {
    config: SplitConfig,
}

impl TextSplitter {
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Split every document, copying its metadata onto each derived chunk.
    ///
    /// Markdown documents are pre-split at heading lines and their chunks
    /// additionally carry the heading path under `header1`..`header3`.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut chunks = Vec::new();
        for doc in documents {
            if doc.is_markdown() {
                for section in split_markdown_sections(&doc.content) {
                    let mut metadata = doc.metadata.clone();
                    section.extend_metadata(&mut metadata);
                    self.push_chunks(&section.body, &metadata, &mut chunks);
                }
            } else {
                self.push_chunks(&doc.content, &doc.metadata, &mut chunks);
            }
        }
        debug!(
            documents = documents.len(),
            chunks = chunks.len(),
            "split corpus into chunks"
        );
        chunks
    }

    /// Split a single text into bounded, overlapping pieces.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        // Units are bounded to `max_chars - overlap` so that a chunk seeded
        // with the previous chunk's tail still respects `max_chars`.
        let unit_cap = self
            .config
            .max_chars
            .saturating_sub(self.config.overlap)
            .max(1);
        let units = split_units(text, unit_cap, SEPARATORS);
        self.merge_units(units)
    }

    fn push_chunks(&self, text: &str, metadata: &Metadata, out: &mut Vec<Document>) {
        for piece in self.split_text(text) {
            out.push(Document {
                content: piece,
                metadata: metadata.clone(),
            });
        }
    }

    /// Accumulate units into chunks up to `max_chars`, seeding each new
    /// chunk with the tail of the previous one.
    fn merge_units(&self, units: Vec<String>) -> Vec<String> {
        let max = self.config.max_chars;
        let overlap = self.config.overlap;

        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for unit in units {
            let unit_len = char_len(&unit);
            if current_len + unit_len > max && !current.trim().is_empty() {
                let emitted = current.trim_end().to_string();
                let seed = char_tail(&emitted, overlap).to_string();
                chunks.push(emitted);
                current_len = char_len(&seed);
                current = seed;
            }
            current.push_str(&unit);
            current_len += unit_len;
        }

        let last = current.trim_end();
        if !last.trim().is_empty() {
            chunks.push(last.to_string());
        }
        chunks
    }
}

/// Recursively split `text` into units of at most `cap` characters, trying
/// each separator in order and descending to the next only for pieces that
/// are still too large.
fn split_units(text: &str, cap: usize, seps: &[&str]) -> Vec<String> {
    if char_len(text) <= cap {
        return vec![text.to_string()];
    }
    let Some((sep, rest)) = seps.split_first() else {
        return split_chars(text, cap);
    };
    let pieces = split_before(text, sep);
    if pieces.len() <= 1 {
        return split_units(text, cap, rest);
    }
    // After splitting at every occurrence, a piece can contain `sep` only
    // as its own leading prefix, so recursion continues with finer ones.
    pieces
        .into_iter()
        .flat_map(|piece| split_units(piece, cap, rest))
        .collect()
}

/// Split at every occurrence of `sep`, keeping the separator attached to the
/// start of the following piece so concatenation is lossless.
fn split_before<'a>(text: &'a str, sep: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0usize;
    let mut scan = 0usize;
    while let Some(pos) = text[scan..].find(sep) {
        let boundary = scan + pos;
        if boundary > start {
            pieces.push(&text[start..boundary]);
            start = boundary;
        }
        scan = boundary + sep.len();
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Last-resort split into windows of `cap` characters.
fn split_chars(text: &str, cap: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;
    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == cap {
            out.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The last `n` characters of `text` (all of it if shorter).
fn char_tail(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let mut start = 0usize;
    let mut seen = 0usize;
    for (idx, _) in text.char_indices().rev() {
        start = idx;
        seen += 1;
        if seen == n {
            break;
        }
    }
    &text[start..]
}

// ---------------------------------------------------------------------------
// Markdown heading pre-split
// ---------------------------------------------------------------------------

/// A contiguous run of Markdown under one heading path.
#[derive(Debug, Clone)]
pub struct MarkdownSection {
    /// Active `#`/`##`/`###` headings, outermost first.
    pub headers: [Option<String>; 3],
    /// Section text, heading line included.
    pub body: String,
}

impl MarkdownSection {
    /// Record the heading path under `header1`..`header3`.
    fn extend_metadata(&self, metadata: &mut Metadata) {
        for (i, header) in self.headers.iter().enumerate() {
            if let Some(title) = header {
                metadata.insert(format!("header{}", i + 1), title.clone());
            }
        }
    }
}

/// Cut Markdown at `#`..`###` heading lines, tracking the heading path.
/// Deeper headings reset when a shallower one appears.
pub fn split_markdown_sections(text: &str) -> Vec<MarkdownSection> {
    let mut sections = Vec::new();
    let mut headers: [Option<String>; 3] = [None, None, None];
    let mut body = String::new();

    for line in text.lines() {
        if let Some((level, title)) = heading_of(line) {
            if !body.trim().is_empty() {
                sections.push(MarkdownSection {
                    headers: headers.clone(),
                    body: std::mem::take(&mut body),
                });
            } else {
                body.clear();
            }
            headers[level - 1] = Some(title.to_string());
            for deeper in headers[level..].iter_mut() {
                *deeper = None;
            }
        }
        body.push_str(line);
        body.push('\n');
    }

    if !body.trim().is_empty() {
        sections.push(MarkdownSection { headers, body });
    }
    sections
}

/// Heading level (1–3) and title of a line, if it is one.
fn heading_of(line: &str) -> Option<(usize, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=3).contains(&hashes) {
        if let Some(title) = line[hashes..].strip_prefix(' ') {
            return Some((hashes, title.trim()));
        }
    }
    None
}
