//! Binary entry point for linetrace.
//!
//! This binary provides the CLI interface for replaying recorded edit
//! sessions and attributing commits.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use linetrace::config::TraceConfig;
use linetrace::models::EditOperation;
use linetrace::observability::init_logging;
use linetrace::{CodeHasher, cli};
use std::path::PathBuf;
use std::process::ExitCode;

/// Linetrace - attributes edited source lines to an AI coding agent.
#[derive(Parser)]
#[command(name = "linetrace")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "LINETRACE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded edit session against a feed dump.
    Replay {
        /// Recorded session file (documents + edit steps, JSON).
        #[arg(long)]
        events: PathBuf,

        /// Feed dump file (opaque item batch, JSON).
        #[arg(long)]
        feed: PathBuf,

        /// Write the resolved corpus here for later attribution.
        #[arg(long)]
        corpus_out: Option<PathBuf>,
    },

    /// Attribute a commit's diff against a resolved corpus.
    Attribute {
        /// Repository path.
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Revision to attribute; omit for the uncommitted working state.
        #[arg(long)]
        rev: Option<String>,

        /// Resolved corpus file (JSON, as written by `replay`).
        #[arg(long)]
        corpus: PathBuf,
    },

    /// Print the content digest for one (file, operation, content).
    Hash {
        /// File name as the tracker spells it.
        #[arg(long)]
        file: String,

        /// Operation symbol: + or -.
        #[arg(long, default_value = "+")]
        operation: String,

        /// The content to digest.
        content: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay {
            events,
            feed,
            corpus_out,
        } => cli::cmd_replay(&events, &feed, corpus_out.as_deref(), config)
            .context("replay failed"),
        Commands::Attribute { repo, rev, corpus } => {
            cli::cmd_attribute(&repo, rev.as_deref(), &corpus, &config)
                .context("attribution failed")
        },
        Commands::Hash {
            file,
            operation,
            content,
        } => cmd_hash(&file, &operation, &content),
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<TraceConfig> {
    match path {
        Some(path) => TraceConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(TraceConfig::default()),
    }
}

fn cmd_hash(file: &str, operation: &str, content: &str) -> anyhow::Result<()> {
    let symbol = operation.chars().next().unwrap_or('+');
    let operation = EditOperation::parse(symbol)
        .with_context(|| format!("operation must be + or -, got '{operation}'"))?;
    println!("{}", CodeHasher::code_hash(file, operation, content));
    Ok(())
}
