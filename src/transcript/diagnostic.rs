//! Non-fatal findings collected while parsing.
//!
//! The parser never fails on malformed content; it drops or passes things
//! through instead. Diagnostics record what happened so tooling can show it.

use super::model::{Conversation, QuotedRef};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Message chunk without a usable `speaker:` header.
    DroppedChunk,
    /// `col:` value rejected by the color grammar.
    InvalidColor,
    UnknownParameter,
    /// Extra lines after a directive.
    IgnoredDirectiveLine,
    /// Theme value that is neither a URL, a path, nor a valid paint.
    InvalidTheme,
    /// Explicit id too large to represent.
    IdOverflow,
    UnterminatedFence,
    /// Quote pointing at a message id that does not exist.
    UnresolvedQuote,
    /// Speaker never declared with `@`.
    UnknownSpeaker,
    DuplicateId,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::DroppedChunk => "dropped-chunk",
            DiagnosticKind::InvalidColor => "invalid-color",
            DiagnosticKind::UnknownParameter => "unknown-parameter",
            DiagnosticKind::IgnoredDirectiveLine => "ignored-directive-line",
            DiagnosticKind::InvalidTheme => "invalid-theme",
            DiagnosticKind::IdOverflow => "id-overflow",
            DiagnosticKind::UnterminatedFence => "unterminated-fence",
            DiagnosticKind::UnresolvedQuote => "unresolved-quote",
            DiagnosticKind::UnknownSpeaker => "unknown-speaker",
            DiagnosticKind::DuplicateId => "duplicate-id",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based source line, when the finding maps to one.
    pub line: Option<usize>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn at(line: usize, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            kind,
            message: message.into(),
        }
    }

    pub fn global(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            line: None,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}: {}: {}", line, self.kind, self.message),
            None => write!(f, "-: {}: {}", self.kind, self.message),
        }
    }
}

impl Conversation {
    /// Cross-reference checks that do not change the parse result:
    /// duplicate ids, quotes of missing ids, and undeclared speakers.
    ///
    /// Speakers are only checked when at least one participant is declared.
    pub fn lint(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut seen = HashSet::new();

        for message in &self.messages {
            if !seen.insert(message.id) {
                diagnostics.push(Diagnostic::global(
                    DiagnosticKind::DuplicateId,
                    format!("message id {} is used more than once", message.id),
                ));
            }
            if let Some(QuotedRef::Id(id)) = message.quoted {
                if self.find_message(id).is_none() {
                    diagnostics.push(Diagnostic::global(
                        DiagnosticKind::UnresolvedQuote,
                        format!("message {} quotes missing message {}", message.id, id),
                    ));
                }
            }
            if !self.participants.is_empty() && self.participant_for(&message.speaker).is_none() {
                diagnostics.push(Diagnostic::global(
                    DiagnosticKind::UnknownSpeaker,
                    format!(
                        "message {} is from undeclared speaker '{}'",
                        message.id, message.speaker
                    ),
                ));
            }
        }

        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::model::{Message, Participant};
    use chrono::Utc;

    fn message(id: u64, speaker: &str, quoted: Option<QuotedRef>) -> Message {
        Message {
            id,
            speaker: speaker.to_string(),
            body: "x".to_string(),
            custom_color: None,
            quoted,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_with_and_without_line() {
        let d = Diagnostic::at(4, DiagnosticKind::DroppedChunk, "no header");
        assert_eq!(d.to_string(), "4: dropped-chunk: no header");
        let d = Diagnostic::global(DiagnosticKind::DuplicateId, "id 2");
        assert_eq!(d.to_string(), "-: duplicate-id: id 2");
    }

    #[test]
    fn test_lint_clean_conversation() {
        let conversation = Conversation {
            messages: vec![message(1, "a", None), message(2, "b", Some(QuotedRef::Id(1)))],
            ..Default::default()
        };
        assert!(conversation.lint().is_empty());
    }

    #[test]
    fn test_lint_findings() {
        let mut conversation = Conversation {
            messages: vec![
                message(1, "alice", None),
                message(1, "ghost", Some(QuotedRef::Id(7))),
                message(2, "alice", Some(QuotedRef::Label("earlier".into()))),
            ],
            ..Default::default()
        };
        conversation
            .participants
            .insert("alice".to_string(), Participant::fallback("alice"));

        let kinds: Vec<DiagnosticKind> = conversation.lint().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::DuplicateId,
                DiagnosticKind::UnresolvedQuote,
                DiagnosticKind::UnknownSpeaker,
            ]
        );
    }

    #[test]
    fn test_kind_serializes_like_display() {
        assert_eq!(
            serde_json::to_string(&DiagnosticKind::UnterminatedFence).unwrap(),
            "\"unterminated-fence\""
        );
    }
}
