//! Parser and tooling for author-written chat transcripts.

pub mod cli;
pub mod config;
pub mod logging;
pub mod markdown;
pub mod transcript;

pub use transcript::{parse, parse_bytes, Conversation, ParseError, TranscriptParser};
