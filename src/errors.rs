//! Unified error handling for mailorigin.
//!
//! A `thiserror`-based model with:
//!   * Typed variants for the failure domains of the pipeline
//!   * A categorization layer (`ErrorCategory`) for structured reporting
//!   * Helper constructors
//!   * `From` conversions for common lower-level errors
//!
//! Categories are coarse:
//!   - Input: user supplied data or configuration problems
//!   - Parse: decoding of mapping / config files
//!   - Render: plot generation failures
//!   - Internal: I/O and unexpected states
//!
//! Variants that wrap external errors retain their sources.

use std::io;

use thiserror::Error;

/// High-level classification for structured reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Parse,
    Render,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Parse => "parse",
            ErrorCategory::Render => "render",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Primary application error type.
#[derive(Error, Debug)]
pub enum MailOriginError {
    // ------------------------ Input / Validation ----------------------------
    #[error("No email addresses found in input")]
    NoAddresses,

    #[error("Invalid address entry '{entry}': {reason}")]
    InvalidAddress { entry: String, reason: String },

    #[error("Country '{name}' is not known to the country table")]
    UnknownCountry { name: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ---------------------------- Parsing -----------------------------------
    #[error("Failed to parse {format} file {path}: {reason}")]
    MappingParse {
        path: String,
        format: String,
        reason: String,
    },

    // ---------------------------- Rendering ---------------------------------
    #[error("Failed to render plot '{title}': {reason}")]
    Plot { title: String, reason: String },

    // ----------------------------- I/O / FS ---------------------------------
    #[error("I/O error during {operation} on {path}: {source}")]
    Io {
        path: String,
        operation: String,
        #[source]
        source: io::Error,
    },

    // ---------------------------- Internal ----------------------------------
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MailOriginError {
    /// Categorize the error for structured output.
    pub fn category(&self) -> ErrorCategory {
        use MailOriginError::*;
        match self {
            NoAddresses
            | InvalidAddress { .. }
            | UnknownCountry { .. }
            | Configuration { .. } => ErrorCategory::Input,

            MappingParse { .. } => ErrorCategory::Parse,

            Plot { .. } => ErrorCategory::Render,

            Io { .. } | Internal { .. } => ErrorCategory::Internal,
        }
    }

    // ---------------------------- Constructors -----------------------------

    pub fn invalid_address(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_country(name: impl Into<String>) -> Self {
        Self::UnknownCountry { name: name.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn mapping_parse(
        path: impl Into<String>,
        format: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MappingParse {
            path: path.into(),
            format: format.into(),
            reason: reason.into(),
        }
    }

    pub fn plot(title: impl Into<String>, reason: impl ToString) -> Self {
        Self::Plot {
            title: title.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<String>, operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal_with(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Public result alias.
pub type Result<T> = std::result::Result<T, MailOriginError>;

/// Map standard IO errors into `Io` variant (generic context).
impl From<io::Error> for MailOriginError {
    fn from(e: io::Error) -> Self {
        MailOriginError::Io {
            path: "<unknown>".into(),
            operation: "unspecified".into(),
            source: e,
        }
    }
}

impl From<crate::config::ConfigError> for MailOriginError {
    fn from(e: crate::config::ConfigError) -> Self {
        match e {
            crate::config::ConfigError::Parse {
                path,
                format,
                reason,
            } => MailOriginError::mapping_parse(path, format, reason),
            other => MailOriginError::configuration(other.to_string()),
        }
    }
}

/// Extension trait for enriching IO results with path + operation context.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, io::Error> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| MailOriginError::io(path.into(), operation.into(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(MailOriginError::NoAddresses.category(), ErrorCategory::Input);
        assert_eq!(
            MailOriginError::mapping_parse("map.yaml", "YAML", "bad").category(),
            ErrorCategory::Parse
        );
        assert_eq!(
            MailOriginError::plot("Domains", "backend").category(),
            ErrorCategory::Render
        );
        assert_eq!(
            MailOriginError::internal("oops").category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_io_with_path() {
        let res: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let err = res.with_path("addresses.txt", "read").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("addresses.txt"));
        assert!(msg.contains("read"));
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_config_error_conversion() {
        let parse = crate::config::ConfigError::Parse {
            path: "map.yaml".to_string(),
            format: "YAML".to_string(),
            reason: "bad indent".to_string(),
        };
        let err: MailOriginError = parse.into();
        assert_eq!(err.category(), ErrorCategory::Parse);
        assert!(err.to_string().contains("map.yaml"));

        let missing = crate::config::ConfigError::MissingRequired {
            field: "plots.output_dir".to_string(),
        };
        let err: MailOriginError = missing.into();
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_display_messages() {
        let err = MailOriginError::invalid_address("foo", "missing '@'");
        assert_eq!(err.to_string(), "Invalid address entry 'foo': missing '@'");
        assert_eq!(ErrorCategory::Render.to_string(), "render");
    }
}
