use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Default separator between entries of an address list (Outlook style).
pub const DEFAULT_DELIMITER: char = ';';

/// A single parsed address with its derived domain parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailRecord {
    pub address: String,
    pub domain: String,
    pub top_level_domain: String,
}

impl MailRecord {
    /// Local part of the address (before the '@').
    pub fn local_part(&self) -> &str {
        self.address
            .split_once('@')
            .map(|(local, _)| local)
            .unwrap_or(&self.address)
    }
}

/// An input entry that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEntry {
    pub raw: String,
    pub reason: String,
}

/// Ordered collection of parsed addresses.
///
/// Records keep the order of the input list; rejected entries are kept
/// aside so the caller can report them.
#[derive(Default, Debug, Clone)]
pub struct MailBook {
    records: Vec<MailRecord>,
    rejected: Vec<RejectedEntry>,
}

impl MailBook {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Parse a single cleaned address and append it.
    pub fn push_address<S: AsRef<str>>(&mut self, address: S) -> bool {
        let address = canonical(address.as_ref());
        match record_from_address(&address) {
            Ok(record) => {
                self.records.push(record);
                true
            }
            Err(reason) => {
                self.rejected.push(RejectedEntry {
                    raw: address,
                    reason,
                });
                false
            }
        }
    }

    pub fn records(&self) -> &[MailRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [MailRecord] {
        &mut self.records
    }

    pub fn rejected(&self) -> &[RejectedEntry] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Addresses failing the syntax plausibility check (kept, but worth a warning).
    pub fn implausible_addresses(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.address.as_str())
            .filter(|a| !is_plausible_email(a))
            .collect()
    }
}

/// Split the raw list into its entries.
pub fn split_entries(raw: &str, delimiter: char) -> impl Iterator<Item = &str> {
    raw.split(delimiter)
}

/// Split `element` on `splitter` and return the cleaned part at `index`.
///
/// Negative indexes count from the end (`-1` is the last part). The part is
/// trimmed and lower-cased. Returns `None` when the index is out of range.
pub fn element_part(element: &str, splitter: char, index: isize) -> Option<String> {
    let parts: Vec<&str> = element.split(splitter).collect();
    let idx = if index < 0 {
        parts.len().checked_sub(index.unsigned_abs())?
    } else {
        index as usize
    };
    parts.get(idx).map(|p| canonical(p))
}

/// Extract the address from an entry like `"foo@bar.de <foo@bar.de>"`.
///
/// The text before the first `<` is used. When that text holds no `@`
/// (display-name form `"Foo Bar <foo@bar.de>"`) the bracketed part is used
/// instead.
pub fn address_from_entry(entry: &str) -> String {
    let head = element_part(entry, '<', 0).unwrap_or_default();
    if head.contains('@') {
        return head;
    }
    if let Some(inner) = element_part(entry, '<', 1) {
        let inner = canonical(inner.trim_end_matches('>'));
        if inner.contains('@') {
            return inner;
        }
    }
    head
}

/// Parse a delimiter separated list of addresses.
pub fn parse_address_list(raw: &str, delimiter: char) -> MailBook {
    let mut book = MailBook::new();
    for entry in split_entries(raw, delimiter) {
        let address = address_from_entry(entry);
        if address.is_empty() {
            continue;
        }
        book.push_address(address);
    }
    book
}

fn record_from_address(address: &str) -> Result<MailRecord, String> {
    let domain = element_part(address, '@', 1).ok_or_else(|| "missing '@'".to_string())?;
    if domain.is_empty() {
        return Err("empty domain".to_string());
    }
    let top_level_domain = element_part(&domain, '.', -1).unwrap_or_default();
    if top_level_domain.is_empty() {
        return Err(format!("no top-level domain in '{domain}'"));
    }
    Ok(MailRecord {
        address: address.to_string(),
        domain,
        top_level_domain,
    })
}

/// Lightweight plausibility check (syntax only).
pub fn is_plausible_email(e: &str) -> bool {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)^[A-Z0-9._%+\-]+@[A-Z0-9.\-]+\.[A-Z]{2,}$").unwrap());
    e.len() <= 254 && RE.is_match(e)
}

/// Canonicalization used internally (trim + lowercase).
fn canonical(s: &str) -> String {
    s.trim().to_lowercase()
}
