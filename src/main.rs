use anyhow::Result;
use chatblock::cli::{run_check, run_extract, run_parse, run_watch, OutputOptions};
use chatblock::config::{Config, OutputFormat};
use chatblock::logging;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "chatblock")]
#[command(version, about = "Parse author-written chat transcripts into structured conversations")]
struct Cli {
    /// Log at debug level (overridden by CHATBLOCK_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.config/chatblock/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a transcript and print the conversation
    Parse {
        /// Transcript file, or - for stdin
        file: PathBuf,
        /// Output format (default from config, else json)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Parse every chat block in a markdown note
    Extract {
        /// Markdown file, or - for stdin
        file: PathBuf,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        #[arg(long)]
        compact: bool,
    },
    /// Print diagnostics for a transcript
    Check {
        /// Transcript file, or - for stdin
        file: PathBuf,
        /// Exit with status 1 when any diagnostic is reported
        #[arg(long)]
        strict: bool,
    },
    /// Re-parse a transcript whenever it changes
    Watch {
        file: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        // An explicit path must load
        Some(path) => Config::load_from(path),
        None => Ok(Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: {e:#}");
            eprintln!("Using default configuration.");
            Config::default()
        })),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    logging::init(cli.verbose, config.log_level.as_deref());

    match cli.command {
        Commands::Parse {
            file,
            format,
            compact,
        } => {
            run_parse(&file, &config, OutputOptions::resolve(&config, format, compact))?;
        }
        Commands::Extract {
            file,
            format,
            compact,
        } => {
            run_extract(&file, &config, OutputOptions::resolve(&config, format, compact))?;
        }
        Commands::Check { file, strict } => {
            let found = run_check(&file, &config)?;
            if strict && found > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Watch { file } => {
            run_watch(&file, &config)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
