//! Alias correction for shorthand and renamed mail domains.
//!
//! Some providers hand out more than one domain for the same mailbox
//! (`pm.me` for ProtonMail, the historic `googlemail.com` for Gmail).
//! Counting them separately would split one provider into several bars, so
//! records are rewritten to the canonical domain before any statistics run.

use serde::{Deserialize, Serialize};

use crate::emails::{MailBook, MailRecord};

/// Rewrite rule: every record on `from_domain` moves to `to_domain`.
///
/// Fields are trimmed and lowercased, whether built in code or loaded from
/// a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAliasRule")]
pub struct AliasRule {
    pub from_domain: String,
    pub to_domain: String,
    pub to_tld: String,
}

/// Alias rule as written in a config file.
#[derive(Deserialize)]
struct RawAliasRule {
    from_domain: String,
    to_domain: String,
    to_tld: String,
}

impl From<RawAliasRule> for AliasRule {
    fn from(raw: RawAliasRule) -> Self {
        Self::new(raw.from_domain, raw.to_domain, raw.to_tld)
    }
}

impl AliasRule {
    pub fn new(
        from_domain: impl Into<String>,
        to_domain: impl Into<String>,
        to_tld: impl Into<String>,
    ) -> Self {
        Self {
            from_domain: from_domain.into().trim().to_lowercase(),
            to_domain: to_domain.into().trim().to_lowercase(),
            to_tld: to_tld.into().trim().to_lowercase(),
        }
    }

    /// Whether this rule rewrites `record`.
    pub fn matches(&self, record: &MailRecord) -> bool {
        record.domain == self.from_domain
    }

    /// Rewrite a single record in place.
    pub fn rewrite(&self, record: &mut MailRecord) {
        record.address = format!("{}@{}", record.local_part(), self.to_domain);
        record.domain = self.to_domain.clone();
        record.top_level_domain = self.to_tld.clone();
    }

    /// Apply to every matching record; returns how many were rewritten.
    pub fn apply(&self, book: &mut MailBook) -> usize {
        let mut rewritten = 0;
        for record in book.records_mut().iter_mut().filter(|r| self.matches(r)) {
            self.rewrite(record);
            rewritten += 1;
        }
        rewritten
    }
}

/// Built-in alias table.
pub fn default_aliases() -> Vec<AliasRule> {
    vec![
        AliasRule::new("pm.me", "protonmail.com", "com"),
        AliasRule::new("googlemail.com", "gmail.com", "com"),
    ]
}

/// Apply `rules` in order. Returns the total number of rewritten records.
pub fn apply_aliases(book: &mut MailBook, rules: &[AliasRule]) -> usize {
    rules.iter().map(|rule| rule.apply(book)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emails::parse_address_list;

    #[test]
    fn test_default_aliases_rewrite() {
        let mut book = parse_address_list(
            "dummy_mail@pm.me <dummy_mail@pm.me>; dummy_mail@googlemail.com; foo@bar.de",
            ';',
        );
        let n = apply_aliases(&mut book, &default_aliases());
        assert_eq!(n, 2);

        let r = book.records();
        assert_eq!(r[0].address, "dummy_mail@protonmail.com");
        assert_eq!(r[0].domain, "protonmail.com");
        assert_eq!(r[0].top_level_domain, "com");
        assert_eq!(r[1].address, "dummy_mail@gmail.com");
        assert_eq!(r[2].domain, "bar.de");
    }

    #[test]
    fn test_only_matching_records_touched() {
        // another .me address must keep its TLD
        let mut book = parse_address_list("a@pm.me; b@proton.me", ';');
        apply_aliases(&mut book, &default_aliases());
        assert_eq!(book.records()[0].top_level_domain, "com");
        assert_eq!(book.records()[1].top_level_domain, "me");
        assert_eq!(book.records()[1].domain, "proton.me");
    }

    #[test]
    fn test_every_match_rewritten() {
        let mut book = parse_address_list("a@pm.me; b@pm.me; c@pm.me", ';');
        let n = AliasRule::new("PM.ME", "protonmail.com", "com").apply(&mut book);
        assert_eq!(n, 3);
        assert!(book.records().iter().all(|r| r.domain == "protonmail.com"));
    }

    #[test]
    fn test_deserialized_rule_is_normalised() {
        let rule: AliasRule = serde_json::from_str(
            r#"{"from_domain": " PM.me", "to_domain": "ProtonMail.com", "to_tld": "COM"}"#,
        )
        .unwrap();
        assert_eq!(rule, AliasRule::new("pm.me", "protonmail.com", "com"));

        let mut book = parse_address_list("a@pm.me", ';');
        assert_eq!(rule.apply(&mut book), 1);
        assert_eq!(book.records()[0].address, "a@protonmail.com");
    }

    #[test]
    fn test_no_match_is_noop() {
        let mut book = parse_address_list("a@bar.de", ';');
        let before = book.records().to_vec();
        assert_eq!(apply_aliases(&mut book, &default_aliases()), 0);
        assert_eq!(book.records(), before.as_slice());
    }
}
