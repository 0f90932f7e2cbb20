//! `#title=` and `#theme=` directives.

use super::chunk::{THEME_PREFIX, TITLE_PREFIXES};
use super::color::is_valid_paint;
use super::model::TranscriptConfig;
use once_cell::sync::Lazy;
use regex::Regex;

static DRIVE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]:[\\/]").unwrap());
static URL_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").unwrap());

/// A recognized directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Title(String),
    /// Already normalized by [`normalize_theme`].
    Theme(Theme),
}

impl Directive {
    /// Parse the first line of a directive chunk.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(value) = TITLE_PREFIXES.iter().find_map(|p| line.strip_prefix(p)) {
            return Some(Directive::Title(value.trim().to_string()));
        }
        line.strip_prefix(THEME_PREFIX)
            .map(|value| Directive::Theme(normalize_theme(value)))
    }

    /// Apply the directive to `config`. An empty title resets to `default_title`.
    pub fn apply(self, config: &mut TranscriptConfig, default_title: &str) {
        match self {
            Directive::Title(title) if title.is_empty() => {
                config.title = default_title.to_string();
            }
            Directive::Title(title) => config.title = title,
            Directive::Theme(theme) => {
                config.theme = theme.value;
                if theme.dark {
                    config.dark = true;
                }
            }
        }
    }
}

/// Result of [`normalize_theme`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub value: String,
    pub dark: bool,
}

impl Theme {
    /// Raw CSS values (not `url(...)`) that fail the paint grammar.
    pub fn is_suspicious(&self) -> bool {
        !self.value.is_empty() && !self.value.starts_with("url(") && !is_valid_paint(&self.value)
    }
}

/// Turn a raw theme value into a CSS background value.
///
/// Quote characters are stripped and a trailing `,dark` sets the dark flag.
/// URLs and local file paths become `url("...")` expressions; local paths get
/// forward slashes and a `file://` scheme. Anything else is returned as is.
pub fn normalize_theme(raw: &str) -> Theme {
    let cleaned: String = raw.chars().filter(|c| *c != '"' && *c != '\'').collect();
    let mut value = cleaned.trim();
    let mut dark = false;
    if let Some(rest) = value.strip_suffix(",dark") {
        value = rest.trim_end();
        dark = true;
    }

    let value = if URL_SCHEME.is_match(value) {
        let url = if value.starts_with("file://") {
            value.replace('\\', "/")
        } else {
            value.to_string()
        };
        format!("url(\"{url}\")")
    } else if DRIVE_MARKER.is_match(value) || value.contains('\\') {
        format!("url(\"file://{}\")", value.replace('\\', "/"))
    } else {
        value.to_string()
    };

    Theme { value, dark }
}
