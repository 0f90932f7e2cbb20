//! Chat transcript parsing.
//!
//! A transcript is a small line-oriented language:
//!
//! ```text
//! #title=Release planning
//! #theme=linear-gradient(#667eea, #764ba2),dark
//! @alice(R,col:#ff6b6b,display:Alice)
//! @bob(pic:🐻)
//! alice: Shall we ship on Friday?
//! 5(#ffd93d)bob: Only if CI is green.
//! > 5
//! ---
//! alice: It is.
//! ```
//!
//! Parsing runs in four stages: fenced code is swapped for placeholder tokens,
//! the remaining lines are grouped into chunks, each chunk becomes a directive,
//! participant declarations or a message, and the code is restored inside
//! message bodies.

pub mod chunk;
pub mod color;
mod diagnostic;
pub mod directive;
mod error;
pub mod fence;
pub mod message;
mod model;
mod parser;
pub mod participant;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::ParseError;
pub use model::{
    default_avatar, Conversation, Message, Participant, QuotedRef, Side, TranscriptConfig,
    DEFAULT_TITLE,
};
pub use parser::{parse, parse_bytes, ParseReport, ParserOptions, TranscriptParser};
