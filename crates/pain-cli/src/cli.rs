//! CLI argument definitions for the pain.001 generator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use pain_core::RunConfig;
use pain_model::{DEFAULT_PARALLEL_THRESHOLD, RecordLayout};

#[derive(Parser)]
#[command(
    name = "pain001",
    version,
    about = "Generate ISO 20022 pain.001 payment initiation messages",
    long_about = "Generate ISO 20022 pain.001 customer credit transfer initiation messages\n\
                  from CSV or SQLite payment records.\n\n\
                  Supports pain.001.001.03, pain.001.001.04 and pain.001.001.09. Every document\n\
                  is validated against its XML schema before it is written."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a pain.001 document from a payment source.
    Generate(GenerateArgs),

    /// List the supported pain.001 revisions.
    Versions,
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Message revision, e.g. pain.001.001.03 or 03.
    #[arg(short = 't', long = "message-type", value_name = "VERSION")]
    pub message_type: String,

    /// CSV/TSV file or SQLite database holding the payment records.
    #[arg(short = 'd', long = "data", value_name = "PATH")]
    pub data: PathBuf,

    /// Schema definition to validate against instead of the embedded one.
    #[arg(short = 's', long = "xsd", value_name = "PATH")]
    pub xsd: Option<PathBuf>,

    /// Output directory for the generated document (default: the data file's directory).
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Table to read from SQLite sources. Characters other than letters,
    /// digits and underscore are replaced.
    #[arg(long = "table", value_name = "NAME", default_value = "pain001")]
    pub table: String,

    /// Field delimiter for delimited sources (a single character, or "tab").
    #[arg(long = "delimiter", value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// How records divide into the batch header and transactions.
    #[arg(long = "layout", value_enum, default_value = "header-row")]
    pub layout: LayoutArg,

    /// Write the run report as JSON to this path.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Give up between stages once this many seconds have passed.
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Check and map transactions in parallel above this batch size.
    #[arg(long = "parallel-threshold", value_name = "N", default_value_t = DEFAULT_PARALLEL_THRESHOLD)]
    pub parallel_threshold: usize,
}

impl GenerateArgs {
    /// Builds the run configuration; cancellation is added by the caller.
    pub fn run_config(&self) -> RunConfig {
        let mut config = RunConfig::new(self.message_type.as_str(), self.data.as_path())
            .with_table(self.table.as_str())
            .with_layout(self.layout.into())
            .with_parallel_threshold(self.parallel_threshold);
        if let Some(xsd) = &self.xsd {
            config = config.with_xsd(xsd.as_path());
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir.as_path());
        }
        if let Some(delimiter) = self.delimiter {
            config = config.with_delimiter(delimiter);
        }
        config
    }
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [byte] if byte.is_ascii() && !byte.is_ascii_alphanumeric() => Ok(*byte),
            _ => Err(format!(
                "'{value}' is not a single ASCII punctuation or whitespace character"
            )),
        },
    }
}

/// Record layout choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// First record is the batch header; every later record is a transaction.
    HeaderRow,
    /// Every record is a transaction; header fields come from the first.
    Inline,
}

impl From<LayoutArg> for RecordLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::HeaderRow => RecordLayout::HeaderRow,
            LayoutArg::Inline => RecordLayout::Inline,
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
