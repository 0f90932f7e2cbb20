//! Pull chat transcript blocks out of markdown notes.
//!
//! Transcripts are usually embedded in a note as a fenced block tagged
//! `chat`. Use a longer outer fence (four backticks) when the transcript
//! itself contains triple-backtick code.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

/// Default fence language that marks a transcript block.
pub const DEFAULT_LANGUAGE: &str = "chat";

/// A transcript block found in a markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatBlock {
    /// 0-based position among the matching blocks.
    pub index: usize,
    /// 1-based line of the opening fence.
    pub line: usize,
    pub source: String,
}

/// Find every fenced code block whose language is one of `languages`.
///
/// The language is the first word of the fence info string, compared
/// case-insensitively.
pub fn extract_blocks(markdown: &str, languages: &[String]) -> Vec<ChatBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (event, range) in Parser::new_ext(markdown, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let language = info.split_whitespace().next().unwrap_or("");
                if languages.iter().any(|l| l.eq_ignore_ascii_case(language)) {
                    current = Some((line_of(markdown, range.start), String::new()));
                }
            }
            Event::Text(text) => {
                if let Some((_, source)) = current.as_mut() {
                    source.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((line, source)) = current.take() {
                    blocks.push(ChatBlock {
                        index: blocks.len(),
                        line,
                        source,
                    });
                }
            }
            _ => {}
        }
    }

    tracing::debug!(blocks = blocks.len(), "extracted chat blocks");
    blocks
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
