//! Styled output formatting for mailorigin using anstyle.
//!
//! Renders the analysis summary as a coloured terminal report: per-address
//! origins, the frequency tables behind the plots, rejected entries and
//! warnings. Colours are disabled when stdout is not a terminal or
//! `NO_COLOR` is set.

use anstyle::{AnsiColor, Color, Style};
use std::fmt::Write;
use std::io::{self, Write as IoWrite};

use crate::analysis::{CountEntry, MailAnalysis};
use crate::resolver::MatchSource;

const RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Rows shown per frequency table before the rest is summarized.
const TABLE_LIMIT: usize = 10;

/// Style definitions for different UI elements
pub struct Styles {
    pub header: Style,
    pub subheader: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    pub muted: Style,
    pub bold: Style,
    pub email: Style,
    pub domain: Style,
    pub country: Style,
    pub unknown: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            header: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Blue))),
            subheader: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
            success: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
            warning: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
            error: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
            info: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))),
            muted: Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))),
            bold: Style::new().bold(),
            email: Style::new()
                .fg_color(Some(Color::Ansi(AnsiColor::Green)))
                .underline(),
            domain: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta))),
            country: Style::new()
                .italic()
                .fg_color(Some(Color::Ansi(AnsiColor::BrightBlue))),
            unknown: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))),
        }
    }
}

/// Styled output formatter for analysis results
pub struct StyledFormatter {
    styles: Styles,
    use_colors: bool,
}

impl StyledFormatter {
    /// Create a new styled formatter
    pub fn new() -> Self {
        Self {
            styles: Styles::default(),
            use_colors: Self::should_use_colors(),
        }
    }

    /// Create a formatter without colors (for non-interactive use)
    pub fn without_colors() -> Self {
        Self {
            styles: Styles::default(),
            use_colors: false,
        }
    }

    fn should_use_colors() -> bool {
        atty::is(atty::Stream::Stdout) && std::env::var("NO_COLOR").is_err()
    }

    /// Apply style to text if colors are enabled
    fn styled(&self, text: &str, style: &Style) -> String {
        if self.use_colors {
            format!("{}{}{}", style.render(), text, style.render_reset())
        } else {
            text.to_string()
        }
    }

    /// Format the full analysis summary.
    pub fn format_analysis(
        &self,
        analysis: &MailAnalysis,
        plots: &[String],
    ) -> Result<String, std::fmt::Error> {
        let mut output = String::new();

        self.write_header(&mut output, analysis)?;
        self.write_records(&mut output, analysis)?;
        self.write_table(&mut output, "🌐 Domains", &analysis.domain_counts)?;
        self.write_table(
            &mut output,
            "🏷️  Top-level domains",
            &analysis.tld_counts,
        )?;
        self.write_table(&mut output, "🗺️  Origins", &analysis.country_counts)?;
        if !analysis.provider_counts.is_empty() {
            self.write_table(&mut output, "📬 Providers", &analysis.provider_counts)?;
        }
        self.write_footer(&mut output, analysis, plots)?;

        Ok(output)
    }

    fn write_header(
        &self,
        output: &mut String,
        analysis: &MailAnalysis,
    ) -> Result<(), std::fmt::Error> {
        writeln!(output)?;
        writeln!(output, "{}", self.styled(RULE, &self.styles.muted))?;
        let title = format!("📧 Origin of {} email addresses", analysis.total());
        writeln!(output, "  {}", self.styled(&title, &self.styles.header))?;

        writeln!(
            output,
            "  {} Known origin: {}",
            self.styled("├─", &self.styles.muted),
            self.styled(
                &format!("{}/{}", analysis.known_origin_count(), analysis.total()),
                &self.styles.bold
            )
        )?;
        if analysis.aliases_applied > 0 {
            writeln!(
                output,
                "  {} Aliases corrected: {}",
                self.styled("├─", &self.styles.muted),
                self.styled(&analysis.aliases_applied.to_string(), &self.styles.bold)
            )?;
        }
        writeln!(
            output,
            "  {} Rejected entries: {}",
            self.styled("└─", &self.styles.muted),
            self.styled(&analysis.rejected.len().to_string(), &self.styles.bold)
        )?;
        writeln!(output, "{}", self.styled(RULE, &self.styles.muted))?;
        Ok(())
    }

    fn write_records(
        &self,
        output: &mut String,
        analysis: &MailAnalysis,
    ) -> Result<(), std::fmt::Error> {
        writeln!(output)?;
        writeln!(
            output,
            "  {}",
            self.styled("📮 Addresses", &self.styles.subheader)
        )?;
        writeln!(output)?;

        for (i, resolved) in analysis.resolved.iter().enumerate() {
            let origin = &resolved.origin;
            let country = if origin.is_known() {
                self.styled(
                    &format!("{} ({})", origin.country_name, origin.country_code),
                    &self.styles.country,
                )
            } else {
                self.styled(&origin.country_name, &self.styles.unknown)
            };
            writeln!(
                output,
                "    {} {}",
                self.styled(&format!("{}.", i + 1), &self.styles.muted),
                self.styled(&resolved.record.address, &self.styles.email)
            )?;
            writeln!(
                output,
                "       {} {} {}",
                self.styled("└─", &self.styles.muted),
                country,
                self.styled(match_hint(origin.matched_by), &self.styles.muted)
            )?;
        }
        Ok(())
    }

    fn write_table(
        &self,
        output: &mut String,
        title: &str,
        entries: &[CountEntry],
    ) -> Result<(), std::fmt::Error> {
        writeln!(output)?;
        writeln!(output, "  {}", self.styled(title, &self.styles.subheader))?;
        if entries.is_empty() {
            writeln!(
                output,
                "    {}",
                self.styled("(none)", &self.styles.muted)
            )?;
            return Ok(());
        }

        let width = entries
            .iter()
            .take(TABLE_LIMIT)
            .map(|e| e.label.chars().count())
            .max()
            .unwrap_or(0);
        for entry in entries.iter().take(TABLE_LIMIT) {
            writeln!(
                output,
                "    {:<width$}  {}",
                self.styled(&entry.label, &self.styles.domain),
                self.styled(&entry.count.to_string(), &self.styles.bold),
                width = width + self.padding_overhead(&self.styles.domain)
            )?;
        }
        if entries.len() > TABLE_LIMIT {
            writeln!(
                output,
                "    {}",
                self.styled(
                    &format!("… {} more", entries.len() - TABLE_LIMIT),
                    &self.styles.muted
                )
            )?;
        }
        Ok(())
    }

    /// Invisible escape bytes added by `styled`, so column padding lines up.
    fn padding_overhead(&self, style: &Style) -> usize {
        if self.use_colors {
            style.render().to_string().len() + style.render_reset().to_string().len()
        } else {
            0
        }
    }

    fn write_footer(
        &self,
        output: &mut String,
        analysis: &MailAnalysis,
        plots: &[String],
    ) -> Result<(), std::fmt::Error> {
        writeln!(output)?;
        writeln!(output, "{}", self.styled(RULE, &self.styles.muted))?;

        if !plots.is_empty() {
            writeln!(
                output,
                "  {} Plots written:",
                self.styled("📊", &self.styles.info)
            )?;
            for (i, plot) in plots.iter().enumerate() {
                let branch = if i + 1 == plots.len() { "└─" } else { "├─" };
                writeln!(
                    output,
                    "    {} {}",
                    self.styled(branch, &self.styles.muted),
                    self.styled(plot, &self.styles.success)
                )?;
            }
            writeln!(output)?;
        }

        if !analysis.rejected.is_empty() {
            writeln!(
                output,
                "  {} Rejected entries:",
                self.styled("✗", &self.styles.error)
            )?;
            for rejected in &analysis.rejected {
                writeln!(
                    output,
                    "    {} {} {}",
                    self.styled("•", &self.styles.error),
                    rejected.raw,
                    self.styled(&format!("({})", rejected.reason), &self.styles.muted)
                )?;
            }
            writeln!(output)?;
        }

        if !analysis.warnings.is_empty() {
            writeln!(
                output,
                "  {} Warnings:",
                self.styled("⚠️", &self.styles.warning)
            )?;
            for warning in &analysis.warnings {
                writeln!(
                    output,
                    "    {} {}",
                    self.styled("•", &self.styles.warning),
                    self.styled(warning, &self.styles.warning)
                )?;
            }
            writeln!(output)?;
        }

        writeln!(output, "{}", self.styled(RULE, &self.styles.muted))?;
        Ok(())
    }

    /// Print the analysis summary to stdout
    pub fn print_analysis(&self, analysis: &MailAnalysis, plots: &[String]) -> io::Result<()> {
        let formatted = self
            .format_analysis(analysis, plots)
            .map_err(|e| io::Error::other(format!("{}", e)))?;
        print!("{}", formatted);
        io::stdout().flush()?;
        Ok(())
    }
}

impl Default for StyledFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn match_hint(source: MatchSource) -> &'static str {
    match source {
        MatchSource::Domain => "[domain]",
        MatchSource::ParentDomain => "[parent domain]",
        MatchSource::TopLevelDomain => "[tld]",
        MatchSource::Unresolved => "",
    }
}
