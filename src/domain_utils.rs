//! Domain utilities with Public Suffix List integration.
//!
//! Mail domains are often subdomains of the organisation that owns them
//! (`mail.example.co.uk`, `students.uni.edu`). The PSL split lets origin
//! lookups fall back from the full domain to the registrable one:
//! - mail.example.co.uk -> example.co.uk
//! - sub.example.com -> example.com
//! - mysite.github.io -> mysite.github.io (github.io is a public suffix)

use anyhow::{Result, anyhow};
use psl::{domain_str, suffix_str};

/// Domain information extracted using PSL or fallback parsing
#[derive(Debug, Clone, PartialEq)]
pub struct DomainInfo {
    /// The full domain as provided
    pub full_domain: String,
    /// The registrable domain (what you can actually register)
    pub registrable_domain: Option<String>,
    /// The subdomain part (if any)
    pub subdomain: Option<String>,
    /// The public suffix (TLD or effective TLD)
    pub suffix: Option<String>,
}

impl DomainInfo {
    /// Parse a domain string into structured domain information
    pub fn parse(domain: &str) -> Result<Self> {
        let clean_domain = clean_domain_input(domain)?;
        Ok(Self::parse_with_psl(&clean_domain))
    }

    fn parse_with_psl(domain: &str) -> Self {
        let mut registrable_domain = domain_str(domain).map(|s| s.to_string());
        let mut subdomain = registrable_domain
            .as_ref()
            .and_then(|reg| subdomain_for(domain, reg));

        if registrable_domain.is_none() {
            let (fallback_reg, fallback_sub) = fallback_registrable_domain(domain);
            registrable_domain = fallback_reg;
            subdomain = fallback_sub;
        }

        let mut suffix = suffix_str(domain).map(|s| s.to_string());
        if suffix.is_none() {
            suffix = domain.split('.').skip(1).last().map(|s| s.to_string());
        }
        if suffix.as_ref().map(|s| s.is_empty()).unwrap_or(false) {
            suffix = None;
        }

        DomainInfo {
            full_domain: domain.to_string(),
            registrable_domain,
            subdomain,
            suffix,
        }
    }

    /// Parent domains from the nearest one up to the registrable domain.
    ///
    /// `a.b.example.co.uk` yields `b.example.co.uk`, then `example.co.uk`.
    /// A registrable domain has no parents.
    pub fn parent_domains(&self) -> Vec<&str> {
        let Some(registrable) = self.registrable_domain.as_deref() else {
            return Vec::new();
        };
        if self.subdomain.is_none() || registrable == self.full_domain {
            return Vec::new();
        }

        let mut parents = Vec::new();
        let mut rest = self.full_domain.as_str();
        while let Some((_, parent)) = rest.split_once('.') {
            parents.push(parent);
            if parent == registrable {
                break;
            }
            rest = parent;
        }
        parents
    }
}

/// Mailbox providers for well known free-mail domains.
const DOMAIN_TO_PROVIDER: &[(&str, &str)] = &[
    ("gmail.co.uk", "Google"),
    ("gmail.com", "Google"),
    ("icloud.com", "Apple"),
    ("me.com", "Apple"),
    ("outlook.be", "Microsoft"),
    ("outlook.co.uk", "Microsoft"),
    ("outlook.com", "Microsoft"),
    ("outlook.fr", "Microsoft"),
    ("hotmail.com", "Microsoft"),
    ("protonmail.com", "ProtonMail"),
    ("proton.me", "ProtonMail"),
    ("yahoo.com", "Yahoo"),
    ("yahoo.in", "Yahoo"),
];

/// Return the mailbox provider hosting `domain`, if it is a known free-mail domain.
pub fn provider_for(domain: &str) -> Option<&'static str> {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    DOMAIN_TO_PROVIDER
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, p)| *p)
}

/// Clean domain input by removing common artifacts
fn clean_domain_input(domain: &str) -> Result<String> {
    let clean = domain.trim().trim_end_matches('.').to_lowercase();

    if clean.is_empty() {
        return Err(anyhow!("Empty domain"));
    }

    // Single labels are allowed for internal domains
    if !clean.contains('.') && clean.len() < 2 {
        return Err(anyhow!("Invalid domain format: {}", clean));
    }

    Ok(clean)
}

fn subdomain_for(full_domain: &str, registrable: &str) -> Option<String> {
    if full_domain == registrable {
        return None;
    }
    if full_domain.len() <= registrable.len() {
        return None;
    }
    if !full_domain.ends_with(registrable) {
        return None;
    }
    let prefix_len = full_domain.len() - registrable.len() - 1;
    if prefix_len == 0 || prefix_len >= full_domain.len() {
        None
    } else {
        Some(full_domain[..prefix_len].to_string())
    }
}

fn fallback_registrable_domain(domain: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return (Some(domain.to_string()), None);
    }
    let registrable = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);
    let subdomain = if parts.len() > 2 {
        Some(parts[..parts.len() - 2].join("."))
    } else {
        None
    };
    (Some(registrable), subdomain)
}
