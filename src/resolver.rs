//! Best-effort origin resolution for mail domains.
//!
//! Lookup order for a record:
//!   1. the full domain in the generic domain map
//!   2. each parent domain in the generic domain map, nearest first, up to
//!      the registrable (PSL) domain
//!   3. the top-level domain in the TLD map
//!   4. `Unknown`

use std::collections::BTreeMap;

use serde::Serialize;

use crate::countries::{self, UNKNOWN};
use crate::domain_utils::DomainInfo;
use crate::emails::MailRecord;
use crate::errors::MailOriginError;

/// Which table produced the country for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Domain,
    ParentDomain,
    TopLevelDomain,
    Unresolved,
}

/// Resolved origin of a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub country_name: String,
    /// ISO 3166-1 alpha-3 code, or `Unknown`.
    pub country_code: String,
    pub matched_by: MatchSource,
}

impl Origin {
    pub fn unknown() -> Self {
        Self {
            country_name: UNKNOWN.to_string(),
            country_code: UNKNOWN.to_string(),
            matched_by: MatchSource::Unresolved,
        }
    }

    pub fn is_known(&self) -> bool {
        self.country_code != UNKNOWN
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRecord {
    #[serde(flatten)]
    pub record: MailRecord,
    #[serde(flatten)]
    pub origin: Origin,
}

#[derive(Debug, Clone, Default)]
pub struct CountryResolver {
    generic_domains: BTreeMap<String, String>,
    tld_countries: BTreeMap<String, String>,
}

impl CountryResolver {
    pub fn new(
        generic_domains: BTreeMap<String, String>,
        tld_countries: BTreeMap<String, String>,
    ) -> Self {
        Self {
            generic_domains: lowercase_keys(generic_domains),
            tld_countries: lowercase_keys(tld_countries),
        }
    }

    /// Resolver with the built-in TLD table and the given domain map.
    pub fn with_generic_domains(generic_domains: BTreeMap<String, String>) -> Self {
        Self::new(generic_domains, countries::default_tld_countries())
    }

    /// Country name for `record` and the table it came from.
    pub fn country_for(&self, record: &MailRecord) -> (String, MatchSource) {
        if let Some(country) = self.generic_domains.get(&record.domain) {
            return (country.clone(), MatchSource::Domain);
        }
        if let Ok(info) = DomainInfo::parse(&record.domain) {
            for parent in info.parent_domains() {
                if let Some(country) = self.generic_domains.get(parent) {
                    return (country.clone(), MatchSource::ParentDomain);
                }
            }
        }
        if let Some(country) = self.tld_countries.get(&record.top_level_domain) {
            return (country.clone(), MatchSource::TopLevelDomain);
        }
        (UNKNOWN.to_string(), MatchSource::Unresolved)
    }

    /// Resolve a record to its origin.
    ///
    /// A country name missing from the metadata table yields code
    /// `Unknown`; the returned warning says why.
    pub fn resolve(&self, record: &MailRecord) -> (Origin, Option<String>) {
        let (name, matched_by) = self.country_for(record);
        if name == UNKNOWN {
            return (
                Origin {
                    country_name: name,
                    country_code: UNKNOWN.to_string(),
                    matched_by,
                },
                None,
            );
        }
        match countries::lookup_by_name(&name) {
            Some(country) => (
                Origin {
                    country_name: country.name.to_string(),
                    country_code: country.alpha3.to_string(),
                    matched_by,
                },
                None,
            ),
            None => (
                Origin {
                    country_name: name.clone(),
                    country_code: UNKNOWN.to_string(),
                    matched_by,
                },
                Some(format!(
                    "{} (domain {}), counted as {UNKNOWN}",
                    MailOriginError::unknown_country(name.as_str()),
                    record.domain
                )),
            ),
        }
    }

    /// Resolve every record. Warnings are de-duplicated.
    pub fn resolve_all(&self, records: &[MailRecord]) -> (Vec<ResolvedRecord>, Vec<String>) {
        let mut warnings: Vec<String> = Vec::new();
        let resolved = records
            .iter()
            .map(|record| {
                let (origin, warning) = self.resolve(record);
                if let Some(w) = warning
                    && !warnings.contains(&w)
                {
                    warnings.push(w);
                }
                ResolvedRecord {
                    record: record.clone(),
                    origin,
                }
            })
            .collect();
        (resolved, warnings)
    }

    pub fn generic_domain_count(&self) -> usize {
        self.generic_domains.len()
    }
}

fn lowercase_keys(map: BTreeMap<String, String>) -> BTreeMap<String, String> {
    map.into_iter()
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect()
}
