//! MailOrigin Library
//!
//! A Rust library for analyzing where a list of email addresses comes from.
//! This library provides functionality to:
//!
//! - Parse delimiter separated address lists (including `Name <addr>` forms)
//! - Rewrite alias domains to their canonical form (`pm.me`, `googlemail.com`)
//! - Resolve each domain to a country via a domain map and a TLD table
//! - Build domain, TLD, provider and country frequency tables
//! - Render bar, pie and world plots with plotters
//!
//! # Example
//!
//! ```rust
//! use mailorigin::analysis::MailAnalysis;
//! use mailorigin::emails::parse_address_list;
//! use mailorigin::resolver::CountryResolver;
//! use std::collections::BTreeMap;
//!
//! let book = parse_address_list("foo@bar.de <foo@bar.de>; x@example.fr", ';');
//! let resolver = CountryResolver::with_generic_domains(BTreeMap::new());
//! let (resolved, _warnings) = resolver.resolve_all(book.records());
//! let analysis = MailAnalysis::from_resolved(resolved);
//!
//! assert_eq!(analysis.known_origin_count(), 2);
//! ```

pub mod aliases;
pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod countries;
pub mod domain_utils;
pub mod emails;
pub mod errors;
pub mod output;
pub mod plots;
pub mod resolver;
pub mod structured_output;
pub mod styled_output;

// Re-export commonly used types and functions for convenience
pub use analysis::{CountEntry, MailAnalysis};
pub use emails::{MailBook, MailRecord, parse_address_list};
pub use errors::{MailOriginError, Result};
pub use plots::{ExportFormat, PlotSet};
pub use resolver::{CountryResolver, Origin};
pub use structured_output::MailOriginReport;
pub use styled_output::StyledFormatter;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
