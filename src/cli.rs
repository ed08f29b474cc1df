use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::plots::ExportFormat;

/// Report format printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Styled (or plain) human-readable summary
    Text,
    /// Pretty-printed JSON report
    Json,
    /// YAML report
    Yaml,
    /// One CSV row per address
    Csv,
}

/// Command-line interface definition.
/// Analyzes domains, top-level domains and the origin of email addresses.
///
/// Verbosity levels:
/// 0 - silent (only final output)
/// 1 - errors (default)
/// 2 - warnings + errors
/// 5 - trace/debug
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Analyze the domains, top-level domains and geographic origin of a list of email addresses"
)]
pub struct Cli {
    /// Semicolon separated address list, e.g. "foo@bar.de <foo@bar.de>; x@pm.me"
    #[arg(conflicts_with = "input")]
    pub addresses: Option<String>,

    /// Read the address list from a file ("-" reads stdin)
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// YAML/JSON config file
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// YAML/JSON file mapping domains to country names
    #[arg(long, value_name = "FILE")]
    pub domain_map: Option<PathBuf>,

    /// Folder the plots are written to
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Plot image format (png or svg)
    #[arg(long, value_parser = parse_export_format)]
    pub format: Option<ExportFormat>,

    /// Separator between address entries
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Skip plot generation
    #[arg(long)]
    pub no_plots: bool,

    /// Do not rewrite alias domains (pm.me, googlemail.com, ...)
    #[arg(long)]
    pub no_aliases: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub report: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Plain text output without styling
    #[arg(long)]
    pub plain: bool,

    /// Print the JSON schema of the structured report and exit
    #[arg(long)]
    pub generate_schema: bool,

    /// Verbosity level (0,1,2,5)
    #[arg(long, default_value_t = 1)]
    pub verbose: u8,
}

fn parse_export_format(s: &str) -> Result<ExportFormat, String> {
    s.parse()
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Convenience: are we in very verbose/debug mode?
    pub fn is_trace(&self) -> bool {
        self.verbose >= 5
    }

    /// Are warning-level messages enabled?
    pub fn warn_enabled(&self) -> bool {
        self.verbose >= 2
    }

    /// Are error-level messages enabled?
    pub fn error_enabled(&self) -> bool {
        self.verbose >= 1
    }

    pub fn is_structured_output(&self) -> bool {
        matches!(self.report, OutputFormat::Json | OutputFormat::Yaml)
    }

    pub fn should_use_styling(&self) -> bool {
        !self.plain
    }
}
