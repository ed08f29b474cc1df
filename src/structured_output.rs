//! Structured output module for JSON and YAML serialization.
//!
//! Defines the machine-readable report of an analysis run: the parsed
//! records with their origin, every frequency table used for the plots,
//! the written plot files and any warnings.

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::{CountEntry, MailAnalysis};
use crate::resolver::MatchSource;

/// Root structure for all mailorigin output in structured formats
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct MailOriginReport {
    /// Tool version and metadata
    pub metadata: ReportMetadata,

    /// Summary of the input that was analyzed
    pub input: InputSummary,

    /// One row per parsed address (after alias correction)
    pub records: Vec<RecordRow>,

    /// Entries that could not be parsed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedRow>,

    /// Frequency tables
    pub statistics: Statistics,

    /// Plot files written
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plots: Vec<String>,

    /// Warnings encountered during processing
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Tool metadata and versioning information
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ReportMetadata {
    pub tool_name: String,
    pub version: String,
    /// Timestamp when analysis was performed
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub schema_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct InputSummary {
    /// Input file, if the list was not given inline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub total_addresses: usize,
    pub rejected_entries: usize,
    pub aliases_applied: usize,
    pub known_origins: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct RecordRow {
    pub address: String,
    pub domain: String,
    pub top_level_domain: String,
    pub country: String,
    pub country_code: String,
    pub matched_by: MatchKind,
}

/// Lookup table that produced the country
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Domain,
    ParentDomain,
    TopLevelDomain,
    Unresolved,
}

impl From<MatchSource> for MatchKind {
    fn from(source: MatchSource) -> Self {
        match source {
            MatchSource::Domain => MatchKind::Domain,
            MatchSource::ParentDomain => MatchKind::ParentDomain,
            MatchSource::TopLevelDomain => MatchKind::TopLevelDomain,
            MatchSource::Unresolved => MatchKind::Unresolved,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RejectedRow {
    pub entry: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Count {
    pub label: String,
    pub count: usize,
}

impl From<&CountEntry> for Count {
    fn from(entry: &CountEntry) -> Self {
        Self {
            label: entry.label.clone(),
            count: entry.count,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct Statistics {
    pub domains: Vec<Count>,
    /// Repeated domains plus the "unique domains" bucket
    pub domain_plot: Vec<Count>,
    pub top_level_domains: Vec<Count>,
    /// Alpha-3 codes of known origins
    pub countries: Vec<Count>,
    pub providers: Vec<Count>,
}

fn counts(entries: &[CountEntry]) -> Vec<Count> {
    entries.iter().map(Count::from).collect()
}

impl MailOriginReport {
    pub fn new() -> Self {
        Self {
            metadata: ReportMetadata {
                tool_name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                generated_at: chrono::Utc::now(),
                schema_version: "1.0".to_string(),
            },
            input: InputSummary::default(),
            records: Vec::new(),
            rejected: Vec::new(),
            statistics: Statistics::default(),
            plots: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Build the report for a finished analysis.
    pub fn from_analysis(analysis: &MailAnalysis, source: Option<String>) -> Self {
        let mut report = Self::new();
        report.input = InputSummary {
            source,
            total_addresses: analysis.total(),
            rejected_entries: analysis.rejected.len(),
            aliases_applied: analysis.aliases_applied,
            known_origins: analysis.known_origin_count(),
        };
        report.records = analysis
            .resolved
            .iter()
            .map(|r| RecordRow {
                address: r.record.address.clone(),
                domain: r.record.domain.clone(),
                top_level_domain: r.record.top_level_domain.clone(),
                country: r.origin.country_name.clone(),
                country_code: r.origin.country_code.clone(),
                matched_by: r.origin.matched_by.into(),
            })
            .collect();
        report.rejected = analysis
            .rejected
            .iter()
            .map(|r| RejectedRow {
                entry: r.raw.clone(),
                reason: r.reason.clone(),
            })
            .collect();
        report.statistics = Statistics {
            domains: counts(&analysis.domain_counts),
            domain_plot: counts(&analysis.domain_bars),
            top_level_domains: counts(&analysis.tld_counts),
            countries: counts(&analysis.country_counts),
            providers: counts(&analysis.provider_counts),
        };
        report.warnings = analysis.warnings.clone();
        report
    }

    /// Generate JSON schema for this output format
    pub fn generate_json_schema() -> Result<String> {
        let schema = schemars::schema_for!(MailOriginReport);
        Ok(serde_json::to_string_pretty(&schema)?)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Default for MailOriginReport {
    fn default() -> Self {
        Self::new()
    }
}
