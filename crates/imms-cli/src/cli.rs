//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use imms_model::Language;

#[derive(Parser)]
#[command(
    name = "imms",
    version,
    about = "School immunization notice preprocessor",
    long_about = "Normalize a school immunization extract into client records.\n\n\
                  Maps vendor headers, validates facilities against the PHIX reference,\n\
                  parses vaccination histories and writes the client artifact and batches."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow client names and identifiers to appear in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full preprocessing pipeline on an extract.
    Run(RunArgs),

    /// Show how the extract's headers map onto the canonical columns.
    MapColumns(MapColumnsArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Extract to process (.csv, .xlsx or .xls).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Notice language (overrides the config file).
    #[arg(long = "language", value_enum)]
    pub language: Option<LanguageArg>,

    /// Configuration file (default: ./parameters.toml when present).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output directory (overrides the config file).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Run identifier used in artifact names (default: UTC timestamp).
    #[arg(long = "run-id", value_name = "ID")]
    pub run_id: Option<String>,

    /// Run every stage without writing the artifact or batch files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct MapColumnsArgs {
    /// Extract whose headers should be inspected.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LanguageArg {
    En,
    Fr,
}

impl From<LanguageArg> for Language {
    fn from(value: LanguageArg) -> Self {
        match value {
            LanguageArg::En => Language::English,
            LanguageArg::Fr => Language::French,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
