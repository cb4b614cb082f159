//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Faculty Finder - hybrid lexical + semantic search over faculty profiles
#[derive(Parser, Debug)]
#[command(name = "facfind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (human, json, plain)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/facfind/config.toml)
    #[arg(long, global = true, env = "FACFIND_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective output format; `--output-format` wins over `--json`.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if let Some(format) = self.output_format {
            return format;
        }
        if self.json {
            return OutputFormat::Json;
        }
        OutputFormat::Human
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search faculty profiles
    Search(commands::search::SearchArgs),

    /// Show one faculty profile from the store
    Show(commands::show::ShowArgs),

    /// List or filter faculty profiles in the store
    List(commands::list::ListArgs),

    /// Check search artifacts and the store
    Doctor(commands::doctor::DoctorArgs),
}
