//! Line classification and chunking.
//!
//! Runs on fence-substituted source. Each chunk is one directive, one block of
//! participant declarations, or one message candidate.

use super::fence::{hidden_lines, FenceTable};
use once_cell::sync::Lazy;
use regex::Regex;

/// Directive prefixes. `#tittle=` is a common misspelling kept as an alias.
pub const TITLE_PREFIXES: &[&str] = &["#title=", "#tittle="];
pub const THEME_PREFIX: &str = "#theme=";

static MESSAGE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+\s*|>\s*\d+\s*|>.*:\s*)?[^:]+:").unwrap());

/// Shape of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Directive,
    Participant,
    /// `>` followed by a reference token.
    QuoteHeader,
    /// `---` between a quote header and the message it belongs to.
    QuoteSeparator,
    /// Optional id, optional quote marker, then `name:`.
    MessageHeader,
    Continuation,
}

/// Classify one line on its own, without looking at its neighbours.
pub fn classify(line: &str) -> LineKind {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with('#') {
        return if is_directive(line) {
            LineKind::Directive
        } else {
            LineKind::Continuation
        };
    }
    if line.starts_with('@') {
        return LineKind::Participant;
    }
    if line == "---" {
        return LineKind::QuoteSeparator;
    }
    if line.len() > 1 && line.starts_with('>') {
        return LineKind::QuoteHeader;
    }
    if MESSAGE_SHAPE.is_match(line) {
        return LineKind::MessageHeader;
    }
    LineKind::Continuation
}

fn is_directive(line: &str) -> bool {
    TITLE_PREFIXES.iter().any(|p| line.starts_with(p)) || line.starts_with(THEME_PREFIX)
}

/// What a chunk is, decided by the line that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Directive,
    Participants,
    Message,
}

/// A run of lines handled as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    /// 1-based line in the original source where the chunk starts.
    pub line: usize,
    /// Trimmed chunk text, lines joined by `\n`.
    pub text: String,
}

/// Where we are inside a quote header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    None,
    /// Saw `> ref`, expecting `---` or the message header.
    Opened,
    /// Saw `---`, expecting the message header.
    Separated,
}

struct OpenChunk {
    kind: ChunkKind,
    line: usize,
    text: String,
}

impl OpenChunk {
    fn new(kind: ChunkKind, line: usize, first: &str) -> Self {
        Self {
            kind,
            line,
            text: first.to_string(),
        }
    }

    fn push_line(&mut self, line: &str) {
        self.text.push('\n');
        self.text.push_str(line);
    }

    fn finish(self) -> Chunk {
        Chunk {
            kind: self.kind,
            line: self.line,
            text: self.text.trim().to_string(),
        }
    }
}

/// Split fence-substituted source into chunks.
///
/// Blank lines are dropped. Directive and participant lines always open a
/// chunk, as do message headers. A `>` line opens a quote chunk only when
/// the next non-blank line is `---` or a message header; the separator and
/// that header then stay in the quote chunk. Continuation lines seen before
/// any chunk is open are discarded.
pub fn chunk_lines(source: &str, fences: &FenceTable) -> Vec<Chunk> {
    let lines: Vec<&str> = source.lines().collect();
    let kinds: Vec<LineKind> = lines.iter().map(|l| classify(l)).collect();

    let mut chunks = Vec::new();
    let mut current: Option<OpenChunk> = None;
    let mut quote = QuoteState::None;
    let mut hidden = 0;

    for (idx, line) in lines.iter().enumerate() {
        let source_line = idx + 1 + hidden;
        hidden += hidden_lines(line, fences);

        let mut kind = kinds[idx];
        if kind == LineKind::QuoteHeader && !opens_quote(&kinds[idx + 1..]) {
            kind = if MESSAGE_SHAPE.is_match(line.trim()) {
                LineKind::MessageHeader
            } else {
                LineKind::Continuation
            };
        }

        let opens = match kind {
            LineKind::Blank => continue,
            LineKind::Directive => Some(ChunkKind::Directive),
            LineKind::Participant => Some(ChunkKind::Participants),
            LineKind::QuoteHeader => Some(ChunkKind::Message),
            LineKind::MessageHeader if quote != QuoteState::None => None,
            LineKind::MessageHeader => Some(ChunkKind::Message),
            LineKind::QuoteSeparator | LineKind::Continuation => None,
        };

        quote = match (kind, quote) {
            (LineKind::QuoteHeader, _) => QuoteState::Opened,
            (LineKind::QuoteSeparator, QuoteState::Opened) => QuoteState::Separated,
            _ => QuoteState::None,
        };

        match opens {
            Some(chunk_kind) => {
                if let Some(done) = current.take() {
                    chunks.push(done.finish());
                }
                current = Some(OpenChunk::new(chunk_kind, source_line, line));
            }
            None => match current.as_mut() {
                Some(open) => open.push_line(line),
                None => {
                    tracing::trace!(line = source_line, "dropping text before first chunk");
                }
            },
        }
    }

    if let Some(done) = current {
        chunks.push(done.finish());
    }
    chunks
}

/// Whether the lines after a `>` line make it a quote header.
fn opens_quote(rest: &[LineKind]) -> bool {
    matches!(
        rest.iter().find(|k| **k != LineKind::Blank),
        Some(LineKind::QuoteSeparator | LineKind::MessageHeader)
    )
}
