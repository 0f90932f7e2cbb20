//! Fenced code block extraction and restoration.
//!
//! Code bodies are swapped out for single-line placeholder tokens before line
//! chunking, so nothing inside a fence can be mistaken for a message header or
//! directive. The bodies live in a [`FenceTable`] indexed by the id embedded in
//! each token and are put back once a message body has been extracted.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Start, separator and end markers of a placeholder token.
/// Private-use code points keep the token clear of every line shape.
const TOKEN_START: char = '\u{e000}';
const TOKEN_SEP: char = '\u{e001}';
const TOKEN_END: char = '\u{e002}';

static FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```([A-Za-z0-9_-]*)\n((?s:.*?))```").unwrap());

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x{e000}FENCE(\d+)\x{e001}([A-Za-z0-9_-]*)\x{e002}").unwrap()
});

/// A code block pulled out of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    pub language: String,
    pub code: String,
    /// Line breaks the fence spanned in the source, all folded into its token.
    pub span: usize,
}

/// Dense arena of extracted fences; the index is the placeholder id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceTable {
    fences: Vec<Fence>,
}

impl FenceTable {
    pub fn get(&self, id: usize) -> Option<&Fence> {
        self.fences.get(id)
    }

    pub fn len(&self) -> usize {
        self.fences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }

    fn push(&mut self, fence: Fence) -> usize {
        self.fences.push(fence);
        self.fences.len() - 1
    }
}

fn placeholder(id: usize, language: &str) -> String {
    format!("{TOKEN_START}FENCE{id}{TOKEN_SEP}{language}{TOKEN_END}")
}

/// Replace every fenced block in `source` with a placeholder token.
///
/// Matching is non-greedy, so sibling fences are extracted one by one.
/// A fence without a closing delimiter is left in the text untouched.
pub fn extract_fences(source: &str) -> (String, FenceTable) {
    let mut table = FenceTable::default();
    let rewritten = FENCE_REGEX.replace_all(source, |caps: &Captures| {
        let language = caps[1].to_string();
        let id = table.push(Fence {
            language: language.clone(),
            code: caps[2].to_string(),
            span: caps[0].matches('\n').count(),
        });
        placeholder(id, &language)
    });
    (rewritten.into_owned(), table)
}

/// Put the original fenced code back in place of each placeholder token.
///
/// Ids missing from the table restore to an empty code body.
pub fn restore_fences(text: &str, table: &FenceTable) -> String {
    TOKEN_REGEX
        .replace_all(text, |caps: &Captures| {
            let language = &caps[2];
            let code = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|id| table.get(id))
                .map(|fence| fence.code.as_str())
                .unwrap_or("");
            let mut block = format!("```{language}\n{code}");
            if !code.is_empty() && !code.ends_with('\n') {
                block.push('\n');
            }
            block.push_str("```");
            block
        })
        .into_owned()
}

/// Source line breaks hidden by the placeholder tokens on `line`.
pub fn hidden_lines(line: &str, table: &FenceTable) -> usize {
    TOKEN_REGEX
        .captures_iter(line)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .filter_map(|id| table.get(id))
        .map(|fence| fence.span)
        .sum()
}

/// 1-based source line numbers of fence delimiters that were left unmatched.
pub fn unterminated_fence_lines(rewritten: &str, table: &FenceTable) -> Vec<usize> {
    let mut hidden = 0;
    let mut found = Vec::new();
    for (i, line) in rewritten.lines().enumerate() {
        if line.contains("```") {
            found.push(i + 1 + hidden);
        }
        hidden += hidden_lines(line, table);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_fence() {
        let source = "alice: look\n```python\nprint(1)\n```\nbob: ok";
        let (rewritten, table) = extract_fences(source);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().language, "python");
        assert_eq!(table.get(0).unwrap().code, "print(1)\n");
        assert_eq!(table.get(0).unwrap().span, 2);
        assert!(!rewritten.contains("print(1)"));
        assert_eq!(rewritten.lines().count(), 3);
        assert!(rewritten.ends_with("\nbob: ok"));
    }

    #[test]
    fn test_extract_sibling_fences_not_merged() {
        let source = "```js\na: 1\n```\ntext\n```\nb: 2\n```";
        let (rewritten, table) = extract_fences(source);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().code, "a: 1\n");
        assert_eq!(table.get(1).unwrap().language, "");
        assert_eq!(table.get(1).unwrap().code, "b: 2\n");
        assert!(rewritten.contains("\ntext\n"));
    }

    #[test]
    fn test_placeholder_hides_colons() {
        let (rewritten, _) = extract_fences("```yaml\nkey: value\n```");
        assert!(!rewritten.contains(':'));
        assert!(!rewritten.contains('\n'));
    }

    #[test]
    fn test_hidden_lines_counts_folded_breaks() {
        let (rewritten, table) = extract_fences("a: x\n```\n1\n2\n```\nb: y");
        let token_line = rewritten.lines().nth(1).unwrap();
        assert_eq!(hidden_lines(token_line, &table), 3);
        assert_eq!(hidden_lines("b: y", &table), 0);
    }

    #[test]
    fn test_unterminated_fence_line_after_extracted_fence() {
        let source = "```\na\nb\n```\nalice: x\n```rust";
        let (rewritten, table) = extract_fences(source);
        assert_eq!(table.len(), 1);
        assert_eq!(unterminated_fence_lines(&rewritten, &table), vec![6]);
    }

    #[test]
    fn test_restore_round_trip() {
        let source = "```python\nprint(1)\n```";
        let (rewritten, table) = extract_fences(source);
        assert_eq!(restore_fences(&rewritten, &table), source);
    }

    #[test]
    fn test_restore_adds_newline_before_closing_fence() {
        let source = "```sh\nls```";
        let (rewritten, table) = extract_fences(source);
        assert_eq!(restore_fences(&rewritten, &table), "```sh\nls\n```");
    }

    #[test]
    fn test_restore_unknown_id_is_empty_block() {
        let text = format!("before {} after", placeholder(7, "rust"));
        let restored = restore_fences(&text, &FenceTable::default());
        assert_eq!(restored, "before ```rust\n``` after");
    }

    #[test]
    fn test_unterminated_fence_passes_through() {
        let source = "alice: see\n```rust\nfn main() {}";
        let (rewritten, table) = extract_fences(source);
        assert!(table.is_empty());
        assert_eq!(rewritten, source);
        assert_eq!(unterminated_fence_lines(&rewritten, &table), vec![2]);
    }
}
