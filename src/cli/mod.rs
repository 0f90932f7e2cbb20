//! Subcommand implementations for the `chatblock` binary.

mod watch;

pub use watch::{run_watch, summarize, TranscriptWatcher};

use crate::config::{Config, OutputFormat};
use crate::markdown::extract_blocks;
use crate::transcript::{Conversation, Diagnostic, ParseError, ParseReport, TranscriptParser};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputOptions {
    /// Config defaults overridden by command-line flags.
    pub fn resolve(config: &Config, format: Option<OutputFormat>, compact: bool) -> Self {
        Self {
            format: format.unwrap_or_else(|| config.output()),
            pretty: config.pretty() && !compact,
        }
    }
}

/// One parsed block of a markdown note.
#[derive(Debug, Serialize)]
pub struct ExtractedBlock {
    pub index: usize,
    pub line: usize,
    pub conversation: Conversation,
}

/// Read a whole file, or stdin when `path` is `-`.
pub fn read_source(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read transcript from stdin")?;
        return Ok(buf);
    }
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn decode(bytes: &[u8], path: &Path) -> Result<String> {
    let text = std::str::from_utf8(bytes)
        .map_err(ParseError::from)
        .with_context(|| format!("Cannot parse {}", path.display()))?;
    Ok(text.to_string())
}

/// Serialize `value` in the requested format.
pub fn render<T: Serialize>(value: &T, output: OutputOptions) -> Result<String> {
    let mut text = match (output.format, output.pretty) {
        (OutputFormat::Json, true) => serde_json::to_string_pretty(value)?,
        (OutputFormat::Json, false) => serde_json::to_string(value)?,
        (OutputFormat::Yaml, _) => serde_yaml::to_string(value)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

fn emit(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .context("Failed to write output")?;
    stdout.flush().context("Failed to write output")
}

/// `chatblock parse`: print the conversation.
pub fn run_parse(path: &Path, config: &Config, output: OutputOptions) -> Result<()> {
    let bytes = read_source(path)?;
    let source = decode(&bytes, path)?;
    let conversation = TranscriptParser::with_options(config.parser_options()).parse(&source);
    emit(&render(&conversation, output)?)
}

/// Parse every chat block of a markdown note.
pub fn extract_conversations(markdown: &str, config: &Config) -> Vec<ExtractedBlock> {
    let parser = TranscriptParser::with_options(config.parser_options());
    extract_blocks(markdown, &config.block_languages())
        .into_iter()
        .map(|block| ExtractedBlock {
            index: block.index,
            line: block.line,
            conversation: parser.parse(&block.source),
        })
        .collect()
}

/// `chatblock extract`: print `{ index, line, conversation }` per chat block.
pub fn run_extract(path: &Path, config: &Config, output: OutputOptions) -> Result<()> {
    let bytes = read_source(path)?;
    let markdown = decode(&bytes, path)?;
    let blocks = extract_conversations(&markdown, config);
    emit(&render(&blocks, output)?)
}

/// Parse and collect diagnostics for `check`.
pub fn check_source(source: &str, config: &Config) -> ParseReport {
    TranscriptParser::with_options(config.parser_options()).parse_report(source)
}

/// Format diagnostics one per line.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics.iter().map(|d| format!("{d}\n")).collect()
}

/// `chatblock check`: print diagnostics. Returns how many were found.
pub fn run_check(path: &Path, config: &Config) -> Result<usize> {
    let bytes = read_source(path)?;
    let source = decode(&bytes, path)?;
    let report = check_source(&source, config);
    emit(&format_diagnostics(&report.diagnostics))?;
    Ok(report.diagnostics.len())
}
