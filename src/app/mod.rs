//! High-level application orchestration layer.
//!
//! This module provides the CLI-facing `App` façade. It reads the address
//! list, corrects aliases, resolves every domain to a country, renders the
//! plot set and finally prints either a structured (JSON/YAML/CSV) or a
//! human-oriented (styled / plain) report.
//!
//! Major steps in `App::run`:
//!   1. Schema generation early-exit
//!   2. Config load / validation
//!   3. Input reading (inline list, file or stdin)
//!   4. Parsing and alias correction
//!   5. Origin resolution and statistics
//!   6. Plot rendering
//!   7. Structured output or styled/plain fallback

use std::fs;
use std::io::{self, Read};

use crate::aliases::apply_aliases;
use crate::analysis::MailAnalysis;
use crate::cli::{Cli, OutputFormat};
use crate::config::{Config, ConfigError};
use crate::emails::{MailBook, parse_address_list};
use crate::errors::{IoResultExt, MailOriginError, Result};
use crate::output::{self, OutputFormat as PlainFormat};
use crate::plots::PlotSet;
use crate::resolver::CountryResolver;
use crate::structured_output::MailOriginReport;
use crate::styled_output::StyledFormatter;

/// Raw address list plus where it came from.
struct InputText {
    text: String,
    source: Option<String>,
}

/// Application façade.
pub struct App;

impl App {
    /// Execute the end-to-end analysis workflow.
    ///
    /// Returns: intended process exit code (0 = success, 1 = user/input error).
    pub fn run(cli: &Cli) -> Result<i32> {
        if Self::maybe_print_schema(cli)? {
            return Ok(0);
        }

        let config = match Self::load_config(cli) {
            Ok(config) => config,
            Err(e) => {
                if cli.error_enabled() {
                    eprintln!("Configuration error: {e}");
                }
                return Ok(1);
            }
        };

        let Some(input) = Self::read_input(cli)? else {
            if cli.error_enabled() {
                eprintln!("Error: no address list given (pass a list, --input FILE or --input -)");
            }
            return Ok(1);
        };

        let mut book = parse_address_list(&input.text, config.input.delimiter);
        if cli.is_trace() {
            eprintln!(
                "[trace] Parsed {} address(es), rejected {} entr(y/ies)",
                book.len(),
                book.rejected().len()
            );
        }
        if cli.warn_enabled() {
            for rejected in book.rejected() {
                eprintln!(
                    "Warning: skipping {}",
                    MailOriginError::invalid_address(&rejected.raw, &rejected.reason)
                );
            }
        }

        if book.is_empty() {
            if cli.error_enabled() {
                eprintln!("Error: {}", MailOriginError::NoAddresses);
            }
            return Ok(1);
        }

        let aliases_applied = apply_aliases(&mut book, &config.resolution.aliases);
        if cli.is_trace() {
            eprintln!("[trace] Alias correction rewrote {aliases_applied} record(s)");
        }

        let mut analysis = Self::analyze(cli, &config, &book)?;
        analysis.aliases_applied = aliases_applied;

        let plots = if config.plots.enabled {
            Self::render_plots(cli, &config, &mut analysis)?
        } else {
            if cli.is_trace() {
                eprintln!("[trace] Plot rendering disabled");
            }
            Vec::new()
        };

        if cli.warn_enabled() {
            for warning in &analysis.warnings {
                eprintln!("Warning: {warning}");
            }
        }

        Self::render_report(cli, &analysis, &plots, input.source)?;
        Ok(0)
    }
}

/// Pipeline stages.
impl App {
    fn maybe_print_schema(cli: &Cli) -> Result<bool> {
        if cli.generate_schema {
            match MailOriginReport::generate_json_schema() {
                Ok(schema) => {
                    println!("{schema}");
                }
                Err(e) => {
                    eprintln!("Error generating JSON schema: {e}");
                }
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// File (if any), then environment, then CLI flags.
    fn load_config(cli: &Cli) -> std::result::Result<Config, ConfigError> {
        let mut config = match cli.config {
            Some(ref path) => {
                if cli.is_trace() {
                    eprintln!("[trace] Loading config from {}", path.display());
                }
                let mut config = Config::from_file(path)?;
                config.apply_env();
                config
            }
            None => Config::from_env(),
        };
        config.merge_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    fn read_input(cli: &Cli) -> Result<Option<InputText>> {
        if let Some(ref list) = cli.addresses {
            return Ok(Some(InputText {
                text: list.clone(),
                source: None,
            }));
        }

        let Some(ref path) = cli.input else {
            return Ok(None);
        };

        if path.as_os_str() == "-" {
            if cli.is_trace() {
                eprintln!("[trace] Reading address list from stdin");
            }
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .with_path("<stdin>", "read address list")?;
            return Ok(Some(InputText {
                text,
                source: Some("<stdin>".to_string()),
            }));
        }

        let display = path.display().to_string();
        if cli.is_trace() {
            eprintln!("[trace] Reading address list from {display}");
        }
        let text = fs::read_to_string(path).with_path(display.clone(), "read address list")?;
        Ok(Some(InputText {
            text,
            source: Some(display),
        }))
    }

    fn analyze(cli: &Cli, config: &Config, book: &MailBook) -> Result<MailAnalysis> {
        let generic_domains = config.resolution.effective_generic_domains()?;
        let resolver =
            CountryResolver::new(generic_domains, config.resolution.effective_tld_countries());
        if cli.is_trace() {
            eprintln!(
                "[trace] Resolving with {} generic domain mapping(s)",
                resolver.generic_domain_count()
            );
        }

        let (resolved, mut warnings) = resolver.resolve_all(book.records());
        for address in book.implausible_addresses() {
            warnings.push(format!("'{address}' does not look like a valid email address"));
        }

        let mut analysis = MailAnalysis::from_resolved(resolved);
        analysis.rejected = book.rejected().to_vec();
        analysis.warnings = warnings;

        if cli.is_trace() {
            eprintln!(
                "[trace] {} of {} address(es) have a known origin",
                analysis.known_origin_count(),
                analysis.total()
            );
        }
        Ok(analysis)
    }

    /// Render the plot set; skipped plots become warnings.
    fn render_plots(
        cli: &Cli,
        config: &Config,
        analysis: &mut MailAnalysis,
    ) -> Result<Vec<String>> {
        let plot_set = PlotSet::new(
            &config.plots.output_dir,
            config.plots.export_format,
            &config.plots.sizes,
        );
        let outcome = plot_set.render_all(analysis)?;

        let written: Vec<String> = outcome
            .written
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        if cli.is_trace() {
            for path in &written {
                eprintln!("[trace] Wrote {path}");
            }
        }
        analysis.warnings.extend(outcome.skipped);
        Ok(written)
    }

    fn render_report(
        cli: &Cli,
        analysis: &MailAnalysis,
        plots: &[String],
        source: Option<String>,
    ) -> Result<()> {
        if cli.is_structured_output() {
            let mut report = MailOriginReport::from_analysis(analysis, source);
            report.plots = plots.to_vec();
            let rendered = if matches!(cli.report, OutputFormat::Json) {
                report.to_json()
            } else {
                report.to_yaml()
            }
            .map_err(|e| MailOriginError::internal_with("Failed to serialize report", e))?;
            println!("{rendered}");
            return Ok(());
        }

        match cli.report {
            OutputFormat::Csv => {
                let formatter = output::create_formatter(&PlainFormat::Csv {
                    include_header: true,
                });
                print!("{}", formatter.format_analysis(analysis)?);
                Ok(())
            }
            _ => {
                if cli.should_use_styling() {
                    let formatter = if cli.no_color {
                        StyledFormatter::without_colors()
                    } else {
                        StyledFormatter::new()
                    };
                    match formatter.print_analysis(analysis, plots) {
                        Ok(()) => return Ok(()),
                        Err(e) => {
                            if cli.warn_enabled() {
                                eprintln!("Warning: styled output failed ({e}), using plain text");
                            }
                        }
                    }
                }

                let formatter = output::create_formatter(&PlainFormat::Text {
                    show_records: true,
                    show_metadata: cli.warn_enabled() || cli.is_trace(),
                });
                print!("{}", formatter.format_analysis(analysis)?);
                for plot in plots {
                    println!("Plot: {plot}");
                }
                Ok(())
            }
        }
    }
}
