//! Transcript parser: fences out, chunk, extract, fences back in.

use super::chunk::{chunk_lines, Chunk, ChunkKind};
use super::diagnostic::{Diagnostic, DiagnosticKind};
use super::directive::Directive;
use super::error::ParseError;
use super::fence::{extract_fences, restore_fences, unterminated_fence_lines, FenceTable};
use super::message::{parse_message, ExplicitId};
use super::model::{Conversation, Message, DEFAULT_TITLE};
use super::participant::{parse_declaration, Rejected};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Knobs that change parser defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Title used when no `#title=` is given or its value is empty.
    pub default_title: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Parse result together with everything that was dropped or doubtful.
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub conversation: Conversation,
    pub diagnostics: Vec<Diagnostic>,
}

/// Reusable parser. Holds only options; all counters live in a per-call state.
#[derive(Debug, Clone, Default)]
pub struct TranscriptParser {
    options: ParserOptions,
}

impl TranscriptParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Parse a transcript into a conversation.
    pub fn parse(&self, source: &str) -> Conversation {
        self.parse_report(source).conversation
    }

    /// Parse raw bytes. Fails only when the bytes are not UTF-8.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Conversation, ParseError> {
        let source = std::str::from_utf8(bytes)?;
        Ok(self.parse(source))
    }

    /// Parse a transcript and collect diagnostics, including cross-reference
    /// findings from [`Conversation::lint`].
    pub fn parse_report(&self, source: &str) -> ParseReport {
        let source = source.trim_start_matches('\u{feff}').replace("\r\n", "\n");
        let (rewritten, fences) = extract_fences(&source);

        let mut state = ParserState::new(&self.options, Utc::now());
        for line in unterminated_fence_lines(&rewritten, &fences) {
            state.diagnostics.push(Diagnostic::at(
                line,
                DiagnosticKind::UnterminatedFence,
                "code fence is never closed; kept as plain text",
            ));
        }

        for chunk in chunk_lines(&rewritten, &fences) {
            match chunk.kind {
                ChunkKind::Directive => state.directive(&chunk),
                ChunkKind::Participants => state.participants(&chunk),
                ChunkKind::Message => state.message(&chunk, &fences),
            }
        }

        let mut diagnostics = state.diagnostics;
        let conversation = state.conversation;
        diagnostics.extend(conversation.lint());
        tracing::debug!(
            messages = conversation.messages.len(),
            participants = conversation.participants.len(),
            fences = fences.len(),
            diagnostics = diagnostics.len(),
            "parsed transcript"
        );

        ParseReport {
            conversation,
            diagnostics,
        }
    }
}

/// Mutable state for one parse call.
struct ParserState<'a> {
    options: &'a ParserOptions,
    /// Next auto-assigned message id. Only ever moves up.
    next_id: u64,
    created_at: DateTime<Utc>,
    conversation: Conversation,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ParserState<'a> {
    fn new(options: &'a ParserOptions, created_at: DateTime<Utc>) -> Self {
        let mut conversation = Conversation::default();
        conversation.config.title = options.default_title.clone();
        Self {
            options,
            next_id: 1,
            created_at,
            conversation,
            diagnostics: Vec::new(),
        }
    }

    /// Take the next auto id, or ratchet the counter past an explicit one.
    /// Explicit ids are not checked for collisions.
    fn assign_id(&mut self, explicit: Option<u64>) -> u64 {
        match explicit {
            Some(id) => {
                self.next_id = self.next_id.max(id.saturating_add(1));
                id
            }
            None => {
                let id = self.next_id;
                self.next_id = self.next_id.saturating_add(1);
                id
            }
        }
    }

    fn directive(&mut self, chunk: &Chunk) {
        let mut lines = chunk.text.lines();
        let Some(directive) = lines.next().and_then(Directive::parse) else {
            return;
        };
        if lines.next().is_some() {
            self.diagnostics.push(Diagnostic::at(
                chunk.line,
                DiagnosticKind::IgnoredDirectiveLine,
                "text after a directive is ignored",
            ));
        }
        if let Directive::Theme(theme) = &directive {
            if theme.is_suspicious() {
                tracing::debug!(line = chunk.line, theme = %theme.value, "theme is not a known paint");
                self.diagnostics.push(Diagnostic::at(
                    chunk.line,
                    DiagnosticKind::InvalidTheme,
                    format!("'{}' is not a recognized color, gradient or image", theme.value),
                ));
            }
        }
        directive.apply(&mut self.conversation.config, &self.options.default_title);
    }

    fn participants(&mut self, chunk: &Chunk) {
        for (offset, line) in chunk.text.lines().enumerate() {
            let line_no = chunk.line + offset;
            let Some(declaration) = parse_declaration(line) else {
                continue;
            };
            for rejected in declaration.rejected {
                let diagnostic = match rejected {
                    Rejected::Color(value) => {
                        tracing::debug!(line = line_no, color = %value, "discarding invalid color");
                        Diagnostic::at(
                            line_no,
                            DiagnosticKind::InvalidColor,
                            format!("'{value}' is not a valid color"),
                        )
                    }
                    Rejected::Unknown(param) => Diagnostic::at(
                        line_no,
                        DiagnosticKind::UnknownParameter,
                        format!("unknown participant parameter '{param}'"),
                    ),
                };
                self.diagnostics.push(diagnostic);
            }
            let participant = declaration.participant;
            tracing::trace!(
                line = line_no,
                handle = %participant.handle,
                side = %participant.side,
                "declared participant"
            );
            self.conversation
                .participants
                .insert(participant.handle.clone(), participant);
        }
    }

    fn message(&mut self, chunk: &Chunk, fences: &FenceTable) {
        let Some(raw) = parse_message(&chunk.text) else {
            tracing::debug!(line = chunk.line, "dropping chunk without a speaker header");
            self.diagnostics.push(Diagnostic::at(
                chunk.line,
                DiagnosticKind::DroppedChunk,
                "no 'speaker:' header; chunk skipped",
            ));
            return;
        };

        let explicit = match raw.explicit_id {
            Some(ExplicitId::Id(id)) => Some(id),
            Some(ExplicitId::Overflow) => {
                self.diagnostics.push(Diagnostic::at(
                    chunk.line,
                    DiagnosticKind::IdOverflow,
                    "message id is too large; assigned the next free id",
                ));
                None
            }
            None => None,
        };

        let id = self.assign_id(explicit);
        self.conversation.messages.push(Message {
            id,
            speaker: raw.speaker,
            body: restore_fences(&raw.body, fences),
            custom_color: raw.custom_color,
            quoted: raw.quoted,
            created_at: self.created_at,
        });
    }
}

/// Parse with default options.
pub fn parse(source: &str) -> Conversation {
    TranscriptParser::new().parse(source)
}

/// Parse bytes with default options.
pub fn parse_bytes(bytes: &[u8]) -> Result<Conversation, ParseError> {
    TranscriptParser::new().parse_bytes(bytes)
}
