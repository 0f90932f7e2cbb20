//! Data model produced by the transcript parser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Title used when a transcript has no `#title=` directive.
pub const DEFAULT_TITLE: &str = "Chat";

/// Transcript-wide settings taken from directive lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptConfig {
    pub title: String,
    /// Raw CSS background value, or a `url("...")` expression for images.
    pub theme: String,
    /// Set by a trailing `,dark` on the theme directive.
    pub dark: bool,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            theme: String::new(),
            dark: false,
        }
    }
}

/// Which side of the conversation a participant's bubbles sit on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    /// Parse the single-letter side token used in declarations.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "L" => Some(Side::Left),
            "R" => Some(Side::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub handle: String,
    pub display_name: String,
    pub avatar: String,
    /// `None` when no valid `col:` parameter was given.
    pub accent_color: Option<String>,
    pub side: Side,
}

impl Participant {
    /// Participant with every field at its default for `handle`.
    ///
    /// Also used by consumers for speakers that were never declared.
    pub fn fallback(handle: &str) -> Self {
        Self {
            handle: handle.to_string(),
            display_name: handle.to_string(),
            avatar: default_avatar(handle),
            accent_color: None,
            side: Side::Left,
        }
    }
}

/// Derive an avatar glyph from a handle.
///
/// Prefers the first CJK ideograph, then the first ASCII letter (upcased),
/// then whatever the first character is.
pub fn default_avatar(handle: &str) -> String {
    if let Some(c) = handle.chars().find(|c| ('\u{4e00}'..='\u{9fff}').contains(c)) {
        return c.to_string();
    }
    if let Some(c) = handle.chars().find(|c| c.is_ascii_alphabetic()) {
        return c.to_ascii_uppercase().to_string();
    }
    handle.chars().next().map(String::from).unwrap_or_default()
}

/// Reference from a reply to the message it quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuotedRef {
    Id(u64),
    Label(String),
}

impl QuotedRef {
    /// Interpret a quote token: purely numeric tokens are message ids.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = token.parse() {
                return QuotedRef::Id(id);
            }
        }
        QuotedRef::Label(token.to_string())
    }
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub speaker: String,
    /// Markdown body with code fences restored.
    pub body: String,
    pub custom_color: Option<String>,
    pub quoted: Option<QuotedRef>,
    /// Capture time of the parse call, not read from the input.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Short label for the quoted message, e.g. `#3` or the free-text label.
    pub fn quote_label(&self) -> Option<String> {
        self.quoted.as_ref().map(|q| match q {
            QuotedRef::Id(id) => format!("#{}", id),
            QuotedRef::Label(label) => label.clone(),
        })
    }
}

/// Full parse result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub config: TranscriptConfig,
    pub participants: BTreeMap<String, Participant>,
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Look up the declared participant for a speaker handle.
    pub fn participant_for(&self, handle: &str) -> Option<&Participant> {
        self.participants.get(handle)
    }

    /// Declared participant, or a default one for undeclared speakers.
    pub fn participant_or_fallback(&self, handle: &str) -> Participant {
        self.participant_for(handle)
            .cloned()
            .unwrap_or_else(|| Participant::fallback(handle))
    }

    /// First message carrying `id`. Duplicate ids resolve to the earliest.
    pub fn find_message(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// The message a reply points at, if the reference is an id that exists.
    pub fn quoted_message(&self, message: &Message) -> Option<&Message> {
        match message.quoted {
            Some(QuotedRef::Id(id)) => self.find_message(id),
            _ => None,
        }
    }
}
