//! Embedded country metadata.
//!
//! The full ISO 3166-1 list (short, official and common names, alpha-2 and
//! alpha-3 codes) is bundled as JSON and parsed once on first use.
//! Centroids are approximate geographic centres used to place markers on
//! the world plot.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Sentinel for origins that could not be resolved.
pub const UNKNOWN: &str = "Unknown";

static COUNTRY_DATA: &str = include_str!("data/countries.json");

static TABLE: Lazy<CountryTable> = Lazy::new(|| {
    CountryTable::from_json(COUNTRY_DATA).expect("bundled country table must parse")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    #[serde(rename = "alpha_2")]
    pub alpha2: String,
    #[serde(rename = "alpha_3")]
    pub alpha3: String,
    /// ISO 3166-1 short name, e.g. `Iran, Islamic Republic of`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Country {
    /// Short, official and common names, in that order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.official_name.as_deref())
            .chain(self.common_name.as_deref())
    }
}

/// Colloquial and historic names the ISO data does not carry.
const NAME_ALIASES: &[(&str, &str)] = &[
    ("korea", "KOR"),
    ("netherlands, kingdom of the", "NLD"),
    ("russia", "RUS"),
    ("saint helena", "SHN"),
    ("turkey", "TUR"),
    ("uk", "GBR"),
    ("great britain", "GBR"),
    ("usa", "USA"),
];

struct CountryTable {
    countries: Vec<Country>,
    by_name: HashMap<String, usize>,
    by_alpha3: HashMap<String, usize>,
}

impl CountryTable {
    fn from_json(json: &str) -> serde_json::Result<Self> {
        let countries: Vec<Country> = serde_json::from_str(json)?;

        let mut by_name = HashMap::new();
        let mut by_alpha3 = HashMap::new();
        for (index, country) in countries.iter().enumerate() {
            by_alpha3.insert(country.alpha3.to_ascii_uppercase(), index);
            for name in country.names() {
                by_name.entry(name.to_lowercase()).or_insert(index);
            }
        }
        for (alias, code) in NAME_ALIASES {
            if let Some(&index) = by_alpha3.get(*code) {
                by_name.entry(alias.to_string()).or_insert(index);
            }
        }

        Ok(Self {
            countries,
            by_name,
            by_alpha3,
        })
    }
}

/// Case-insensitive lookup by short, official or common name, or a known
/// alias.
pub fn lookup_by_name(name: &str) -> Option<&'static Country> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    TABLE.by_name.get(&needle).map(|&i| &TABLE.countries[i])
}

pub fn lookup_alpha3(code: &str) -> Option<&'static Country> {
    TABLE
        .by_alpha3
        .get(&code.trim().to_ascii_uppercase())
        .map(|&i| &TABLE.countries[i])
}

/// Top-level domain to country name.
///
/// Generic and vanity TLDs map to `Unknown`; `.wtf` is registered to a
/// Canadian company and therefore maps to Canada.
pub fn default_tld_countries() -> BTreeMap<String, String> {
    const TLDS: &[(&str, &str)] = &[
        ("ar", "Argentina"),
        ("au", "Australia"),
        ("be", "Belgium"),
        ("br", "Brazil"),
        ("ca", "Canada"),
        ("ch", "Switzerland"),
        ("cl", "Chile"),
        ("com", UNKNOWN),
        ("de", "Germany"),
        ("dev", UNKNOWN),
        ("edu", UNKNOWN),
        ("es", "Spain"),
        ("fr", "France"),
        ("hk", "Hong Kong"),
        ("id", "Indonesia"),
        ("ie", "Ireland"),
        ("in", "India"),
        ("io", UNKNOWN),
        ("it", "Italy"),
        ("jp", "Japan"),
        ("lr", "Liberia"),
        ("me", UNKNOWN),
        ("mx", "Mexico"),
        ("ne", "Niger"),
        ("net", UNKNOWN),
        ("nl", "Netherlands"),
        ("np", "Nepal"),
        ("ru", "Russian Federation"),
        ("sa", "Saudi Arabia"),
        ("sh", "Saint Helena, Ascension and Tristan da Cunha"),
        ("sk", "Slovakia"),
        ("uk", "United Kingdom"),
        ("us", "United States"),
        ("wtf", "Canada"),
        ("zw", "Zimbabwe"),
    ];
    TLDS.iter()
        .map(|(tld, country)| (tld.to_string(), country.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> &'static [Country] {
        &TABLE.countries
    }

    #[test]
    fn test_table_covers_iso_3166_1() {
        assert_eq!(all().len(), 249);
        assert!(all().windows(2).all(|w| w[0].alpha3 < w[1].alpha3));
    }

    #[test]
    fn test_every_tld_country_is_known() {
        for (tld, name) in default_tld_countries() {
            if name == UNKNOWN {
                continue;
            }
            assert!(
                lookup_by_name(&name).is_some(),
                "country for .{tld} missing: {name}"
            );
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(lookup_by_name("Germany").unwrap().alpha3, "DEU");
        assert_eq!(lookup_by_name("russian federation").unwrap().alpha3, "RUS");
        assert_eq!(lookup_by_name("Russia").unwrap().alpha3, "RUS");
        assert!(lookup_by_name(UNKNOWN).is_none());
        assert!(lookup_by_name("").is_none());
    }

    #[test]
    fn test_lookup_official_and_common_names() {
        let iran = lookup_by_name("Iran, Islamic Republic of").unwrap();
        assert_eq!(iran.alpha3, "IRN");
        assert_eq!(lookup_by_name("Islamic Republic of Iran"), Some(iran));
        assert_eq!(lookup_by_name("iran"), Some(iran));

        assert_eq!(lookup_by_name("Qatar").unwrap().alpha3, "QAT");
        assert_eq!(lookup_by_name("Republic of Belarus").unwrap().alpha3, "BLR");
        assert_eq!(lookup_by_name("Cuba").unwrap().alpha3, "CUB");
        assert_eq!(lookup_by_name("Czech Republic").unwrap().alpha3, "CZE");
        assert_eq!(lookup_by_name("Viet Nam").unwrap().alpha3, "VNM");
        assert_eq!(lookup_by_name("vietnam").unwrap().alpha3, "VNM");
        assert_eq!(lookup_by_name("Åland Islands").unwrap().alpha2, "AX");
    }

    #[test]
    fn test_lookup_alpha3() {
        let country = lookup_alpha3("blr").unwrap();
        assert_eq!(country.name, "Belarus");
        assert_eq!(country.official_name.as_deref(), Some("Republic of Belarus"));
        assert!(lookup_alpha3(UNKNOWN).is_none());
    }

    #[test]
    fn test_codes_unique() {
        let mut alpha3: Vec<&str> = all().iter().map(|c| c.alpha3.as_str()).collect();
        let mut alpha2: Vec<&str> = all().iter().map(|c| c.alpha2.as_str()).collect();
        alpha3.sort();
        alpha3.dedup();
        alpha2.sort();
        alpha2.dedup();
        assert_eq!(alpha3.len(), all().len());
        assert_eq!(alpha2.len(), all().len());
    }

    #[test]
    fn test_centroids_in_range() {
        for c in all() {
            assert!((-90.0..=90.0).contains(&c.latitude), "{}", c.name);
            assert!((-180.0..=180.0).contains(&c.longitude), "{}", c.name);
        }
    }
}
