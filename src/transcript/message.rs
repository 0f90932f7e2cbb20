//! Message chunk extraction: quote header, then `[id][(color)]speaker: body`.

use super::model::QuotedRef;
use once_cell::sync::Lazy;
use regex::Regex;

static QUOTE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^>([^\n]+)\n(?:[ \t]*---[ \t]*\n)?((?s:.*))").unwrap());

static HEADER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+)(?:\(((?:[^()]|\([^()]*\))+)\))?)?([^:\n]*):\s*((?s:.*))").unwrap()
});

/// Explicit id written in a message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplicitId {
    Id(u64),
    /// Digits present but too large for `u64`. `u64::MAX` counts too, since
    /// no id could follow it.
    Overflow,
}

/// Fields pulled out of a message chunk, before id assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub explicit_id: Option<ExplicitId>,
    pub custom_color: Option<String>,
    pub speaker: String,
    /// Body text, still holding fence placeholder tokens.
    pub body: String,
    pub quoted: Option<QuotedRef>,
}

/// Split a leading quote header off `chunk`.
///
/// Returns the reference and the remaining text, or `None` when the chunk
/// does not start with `>` followed by a newline.
pub fn split_quote(chunk: &str) -> Option<(QuotedRef, &str)> {
    let caps = QUOTE_REGEX.captures(chunk)?;
    let reference = caps.get(1)?.as_str();
    let rest = caps.get(2)?.as_str();
    Some((QuotedRef::from_token(reference), rest))
}

/// Extract a message from a chunk, or `None` when the header does not match.
///
/// A header needs a speaker before the colon unless an explicit id is given,
/// in which case the speaker may be empty (`5: hello`).
pub fn parse_message(chunk: &str) -> Option<RawMessage> {
    let chunk = chunk.trim();
    let (quoted, content) = match split_quote(chunk) {
        Some((quoted, rest)) => (Some(quoted), rest),
        None => (None, chunk),
    };

    let caps = HEADER_REGEX.captures(content)?;
    let explicit_id = caps.get(1).map(|m| {
        m.as_str()
            .parse::<u64>()
            .ok()
            .filter(|id| *id < u64::MAX)
            .map_or(ExplicitId::Overflow, ExplicitId::Id)
    });
    let speaker = caps.get(3).map_or("", |m| m.as_str()).trim();
    if speaker.is_empty() && explicit_id.is_none() {
        return None;
    }
    let custom_color = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    let body = caps.get(4).map_or("", |m| m.as_str()).trim();

    Some(RawMessage {
        explicit_id,
        custom_color,
        speaker: speaker.to_string(),
        body: body.to_string(),
        quoted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message() {
        let m = parse_message("alice: hello there").unwrap();
        assert_eq!(m.speaker, "alice");
        assert_eq!(m.body, "hello there");
        assert!(m.explicit_id.is_none());
        assert!(m.custom_color.is_none());
        assert!(m.quoted.is_none());
    }

    #[test]
    fn test_explicit_id_and_color() {
        let m = parse_message("12(#00ff00)bob: green").unwrap();
        assert_eq!(m.explicit_id, Some(ExplicitId::Id(12)));
        assert_eq!(m.custom_color.as_deref(), Some("#00ff00"));
        assert_eq!(m.speaker, "bob");
        assert_eq!(m.body, "green");
    }

    #[test]
    fn test_color_with_nested_parens() {
        let m = parse_message("3(rgba(0,0,0,0.4))carol: dim").unwrap();
        assert_eq!(m.custom_color.as_deref(), Some("rgba(0,0,0,0.4)"));
        assert_eq!(m.speaker, "carol");
    }

    #[test]
    fn test_id_without_speaker() {
        let m = parse_message("5: hello").unwrap();
        assert_eq!(m.explicit_id, Some(ExplicitId::Id(5)));
        assert_eq!(m.speaker, "");
        assert_eq!(m.body, "hello");
    }

    #[test]
    fn test_id_overflow() {
        let m = parse_message("99999999999999999999999alice: big").unwrap();
        assert_eq!(m.explicit_id, Some(ExplicitId::Overflow));
        assert_eq!(m.speaker, "alice");
    }

    #[test]
    fn test_max_id_counts_as_overflow() {
        let max = format!("{}bob: edge", u64::MAX);
        assert_eq!(parse_message(&max).unwrap().explicit_id, Some(ExplicitId::Overflow));
        let below = format!("{}bob: edge", u64::MAX - 1);
        assert_eq!(
            parse_message(&below).unwrap().explicit_id,
            Some(ExplicitId::Id(u64::MAX - 1))
        );
    }

    #[test]
    fn test_multiline_body() {
        let m = parse_message("alice: first\nsecond: line\n  third").unwrap();
        assert_eq!(m.speaker, "alice");
        assert_eq!(m.body, "first\nsecond: line\n  third");
    }

    #[test]
    fn test_quote_with_separator() {
        let m = parse_message("> 3\n---\nalice: hi").unwrap();
        assert_eq!(m.quoted, Some(QuotedRef::Id(3)));
        assert_eq!(m.speaker, "alice");
        assert_eq!(m.body, "hi");
    }

    #[test]
    fn test_quote_separator_with_padding() {
        for chunk in ["> 3\n--- \nalice: hi", "> 3\n  ---\t\n  alice: hi"] {
            let m = parse_message(chunk).unwrap();
            assert_eq!(m.quoted, Some(QuotedRef::Id(3)));
            assert_eq!(m.speaker, "alice");
            assert_eq!(m.body, "hi");
        }
    }

    #[test]
    fn test_quote_label_without_separator() {
        let m = parse_message(">the launch plan\nbob: agreed").unwrap();
        assert_eq!(
            m.quoted,
            Some(QuotedRef::Label("the launch plan".to_string()))
        );
        assert_eq!(m.body, "agreed");
    }

    #[test]
    fn test_no_header_is_dropped() {
        assert!(parse_message("random text with no colon").is_none());
        assert!(parse_message(": orphan body").is_none());
    }

    #[test]
    fn test_speaker_does_not_span_lines() {
        assert!(parse_message("> 1\nplain words\nbob: x").is_none());
    }

    #[test]
    fn test_empty_body() {
        let m = parse_message("alice:").unwrap();
        assert_eq!(m.body, "");
    }
}
