//! Shared analysis data structures consumed by plots and output formatters.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain_utils::provider_for;
use crate::emails::{MailRecord, RejectedEntry};
use crate::resolver::ResolvedRecord;

/// Bar label collecting all domains that occur exactly once.
pub const UNIQUE_DOMAINS_LABEL: &str = "unique domains";

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

impl CountEntry {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Frequency table sorted by count (descending), ties by label.
pub fn value_counts<I, S>(values: I) -> Vec<CountEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut map: HashMap<String, usize> = HashMap::new();
    for v in values {
        *map.entry(v.as_ref().to_string()).or_insert(0) += 1;
    }
    let mut v: Vec<CountEntry> = map
        .into_iter()
        .map(|(label, count)| CountEntry { label, count })
        .collect();
    v.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    v
}

/// Bars for the domain plot: every repeated domain, plus one bar counting
/// the domains that occur only once.
pub fn domain_plot_data(records: &[MailRecord]) -> Vec<CountEntry> {
    let counts = value_counts(records.iter().map(|r| r.domain.as_str()));
    let unique = counts.iter().filter(|c| c.count == 1).count();
    let mut bars: Vec<CountEntry> = counts.into_iter().filter(|c| c.count > 1).collect();
    bars.push(CountEntry::new(UNIQUE_DOMAINS_LABEL, unique));
    bars
}

pub fn tld_counts(records: &[MailRecord]) -> Vec<CountEntry> {
    value_counts(records.iter().map(|r| r.top_level_domain.as_str()))
}

/// Alpha-3 code counts of records with a known origin.
pub fn country_counts(resolved: &[ResolvedRecord]) -> Vec<CountEntry> {
    value_counts(
        resolved
            .iter()
            .filter(|r| r.origin.is_known())
            .map(|r| r.origin.country_code.as_str()),
    )
}

/// Mailbox provider counts; domains without a known provider are skipped.
pub fn provider_counts(records: &[MailRecord]) -> Vec<CountEntry> {
    value_counts(records.iter().filter_map(|r| provider_for(&r.domain)))
}

/// Full result of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct MailAnalysis {
    pub resolved: Vec<ResolvedRecord>,
    pub rejected: Vec<RejectedEntry>,
    pub aliases_applied: usize,
    pub domain_bars: Vec<CountEntry>,
    pub domain_counts: Vec<CountEntry>,
    pub tld_counts: Vec<CountEntry>,
    pub country_counts: Vec<CountEntry>,
    pub provider_counts: Vec<CountEntry>,
    pub warnings: Vec<String>,
}

impl MailAnalysis {
    /// Build all frequency tables from resolved records.
    pub fn from_resolved(resolved: Vec<ResolvedRecord>) -> Self {
        let records: Vec<MailRecord> = resolved.iter().map(|r| r.record.clone()).collect();
        Self {
            domain_bars: domain_plot_data(&records),
            domain_counts: value_counts(records.iter().map(|r| r.domain.as_str())),
            tld_counts: tld_counts(&records),
            country_counts: country_counts(&resolved),
            provider_counts: provider_counts(&records),
            resolved,
            ..Default::default()
        }
    }

    pub fn total(&self) -> usize {
        self.resolved.len()
    }

    pub fn known_origin_count(&self) -> usize {
        self.resolved.iter().filter(|r| r.origin.is_known()).count()
    }
}
