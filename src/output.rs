//! Plain output formatting for mailorigin results.
//!
//! Unstyled text and CSV renderings of an analysis, used with `--plain`,
//! `--report csv` and as the fallback when styled output fails.

use std::io;

use crate::analysis::{CountEntry, MailAnalysis};

/// Plain output format options
#[derive(Debug, Clone)]
pub enum OutputFormat {
    /// Human-readable text format
    Text {
        /// List every address with its origin
        show_records: bool,
        /// Show rejected entries and warnings
        show_metadata: bool,
    },

    /// CSV format, one row per address
    Csv {
        /// Include header row
        include_header: bool,
    },
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Text {
            show_records: true,
            show_metadata: true,
        }
    }
}

/// Output formatter trait
pub trait OutputFormatter {
    fn format_analysis(&self, analysis: &MailAnalysis) -> io::Result<String>;
}

/// Text output formatter
pub struct TextFormatter {
    show_records: bool,
    show_metadata: bool,
}

impl TextFormatter {
    pub fn new(show_records: bool, show_metadata: bool) -> Self {
        Self {
            show_records,
            show_metadata,
        }
    }
}

fn push_table(output: &mut String, title: &str, entries: &[CountEntry]) {
    output.push_str(&format!("{}:\n", title));
    for entry in entries {
        output.push_str(&format!("  {}\t{}\n", entry.label, entry.count));
    }
}

impl OutputFormatter for TextFormatter {
    fn format_analysis(&self, analysis: &MailAnalysis) -> io::Result<String> {
        let mut output = String::new();

        if analysis.resolved.is_empty() {
            output.push_str("No email addresses to analyze\n");
            return Ok(output);
        }

        if self.show_records {
            for r in &analysis.resolved {
                output.push_str(&format!(
                    "{}\t{}\t{}\n",
                    r.record.address, r.origin.country_name, r.origin.country_code
                ));
            }
            output.push('\n');
        }

        push_table(&mut output, "Domains", &analysis.domain_counts);
        push_table(&mut output, "Top-level domains", &analysis.tld_counts);
        push_table(&mut output, "Origins", &analysis.country_counts);

        if self.show_metadata {
            if !analysis.rejected.is_empty() {
                output.push_str("\nRejected:\n");
                for r in &analysis.rejected {
                    output.push_str(&format!("  {} ({})\n", r.raw, r.reason));
                }
            }
            if !analysis.warnings.is_empty() {
                output.push_str("\nWarnings:\n");
                for warning in &analysis.warnings {
                    output.push_str(&format!("  {}\n", warning));
                }
            }
        }

        Ok(output)
    }
}

/// CSV output formatter
pub struct CsvFormatter {
    include_header: bool,
}

impl CsvFormatter {
    pub fn new(include_header: bool) -> Self {
        Self { include_header }
    }
}

/// Quote a field if it contains the separator, quotes or newlines.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_analysis(&self, analysis: &MailAnalysis) -> io::Result<String> {
        let mut output = String::new();

        if self.include_header {
            output.push_str("address,domain,top_level_domain,country,country_code\n");
        }

        for r in &analysis.resolved {
            let fields = [
                r.record.address.as_str(),
                r.record.domain.as_str(),
                r.record.top_level_domain.as_str(),
                r.origin.country_name.as_str(),
                r.origin.country_code.as_str(),
            ];
            let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
            output.push_str(&row.join(","));
            output.push('\n');
        }

        Ok(output)
    }
}

/// Create a formatter based on the output format
pub fn create_formatter(format: &OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text {
            show_records,
            show_metadata,
        } => Box::new(TextFormatter::new(*show_records, *show_metadata)),
        OutputFormat::Csv { include_header } => Box::new(CsvFormatter::new(*include_header)),
    }
}
