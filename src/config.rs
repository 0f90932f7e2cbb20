use crate::markdown::DEFAULT_LANGUAGE;
use crate::transcript::{ParserOptions, DEFAULT_TITLE};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output encoding for parse results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Title for transcripts without a `#title=` directive.
    /// Default: "Chat"
    pub default_title: Option<String>,
    /// Fence languages treated as transcripts inside markdown notes.
    /// Default: ["chat"]
    /// Example: ["chat", "dialogue"]
    pub block_languages: Option<Vec<String>>,
    /// Default: "json"
    pub output: Option<OutputFormat>,
    /// Pretty-print output. Default: true
    pub pretty: Option<bool>,
    /// tracing filter directive, e.g. "debug" or "chatblock=trace".
    /// `CHATBLOCK_LOG` takes precedence.
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from ~/.config/chatblock/config.toml
    ///
    /// - File missing: returns default config (Ok)
    /// - File exists but invalid TOML: returns Err so caller can show warning
    /// - Field missing or empty: uses the built-in default
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn default_title(&self) -> &str {
        match &self.default_title {
            Some(title) if !title.trim().is_empty() => title.trim(),
            _ => DEFAULT_TITLE,
        }
    }

    /// Configured block languages, ignoring blank entries.
    pub fn block_languages(&self) -> Vec<String> {
        let languages: Vec<String> = self
            .block_languages
            .iter()
            .flatten()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if languages.is_empty() {
            vec![DEFAULT_LANGUAGE.to_string()]
        } else {
            languages
        }
    }

    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }

    pub fn pretty(&self) -> bool {
        self.pretty.unwrap_or(true)
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            default_title: self.default_title().to_string(),
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|d| d.join(".config").join("chatblock").join("config.toml"))
    }
}
