//! Configuration management for mailorigin.
//!
//! Configuration can be loaded from a YAML/JSON file, environment variables
//! or command-line arguments (highest precedence). It centralizes the input
//! delimiter, the alias and lookup tables, and the plot output settings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aliases::{AliasRule, default_aliases};
use crate::countries::default_tld_countries;
use crate::emails::DEFAULT_DELIMITER;
use crate::plots::{ExportFormat, PlotSizes};

/// Main configuration structure for mailorigin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input parsing settings
    pub input: InputConfig,

    /// Alias correction and origin lookup tables
    pub resolution: ResolutionConfig,

    /// Plot output settings
    pub plots: PlotConfig,
}

/// Input parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Separator between address entries
    pub delimiter: char,
}

/// Origin resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Domain rewrite rules applied before any statistics
    pub aliases: Vec<AliasRule>,

    /// Domain -> country overrides (checked before the TLD table)
    pub generic_domains: BTreeMap<String, String>,

    /// Extra or replacement TLD -> country entries
    pub tld_countries: BTreeMap<String, String>,

    /// External domain -> country map (YAML or JSON)
    pub domain_map: Option<PathBuf>,
}

/// Plot output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Whether plots are rendered at all
    pub enabled: bool,

    /// Target folder for the plot files
    pub output_dir: PathBuf,

    /// Image format
    pub export_format: ExportFormat,

    /// Canvas sizes
    pub sizes: PlotSizes,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
            generic_domains: BTreeMap::new(),
            tld_countries: BTreeMap::new(),
            domain_map: None,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("results"),
            export_format: ExportFormat::Png,
            sizes: PlotSizes::default(),
        }
    }
}

impl ResolutionConfig {
    /// Built-in TLD table with the configured entries layered on top.
    pub fn effective_tld_countries(&self) -> BTreeMap<String, String> {
        let mut map = default_tld_countries();
        map.extend(
            self.tld_countries
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.clone())),
        );
        map
    }

    /// Configured generic domains merged with the external domain map
    /// (map file entries win).
    pub fn effective_generic_domains(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        let mut map = self.generic_domains.clone();
        if let Some(ref path) = self.domain_map {
            map.extend(load_domain_map(path)?);
        }
        Ok(map)
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML or JSON file (by extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        read_structured(path.as_ref())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::new();
        config.apply_env();
        config
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("MAILORIGIN_OUTPUT_DIR")
            && !dir.trim().is_empty()
        {
            self.plots.output_dir = PathBuf::from(dir);
        }

        if let Ok(format) = std::env::var("MAILORIGIN_EXPORT_FORMAT")
            && let Ok(f) = format.parse::<ExportFormat>()
        {
            self.plots.export_format = f;
        }

        if let Ok(delim) = std::env::var("MAILORIGIN_DELIMITER") {
            let mut chars = delim.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                self.input.delimiter = c;
            }
        }

        if let Ok(map) = std::env::var("MAILORIGIN_DOMAIN_MAP")
            && !map.trim().is_empty()
        {
            self.resolution.domain_map = Some(PathBuf::from(map));
        }
    }

    /// Merge with CLI arguments, giving CLI precedence
    pub fn merge_with_cli(&mut self, cli: &crate::cli::Cli) {
        if let Some(ref dir) = cli.output_dir {
            self.plots.output_dir = dir.clone();
        }

        if let Some(format) = cli.format {
            self.plots.export_format = format;
        }

        if let Some(delimiter) = cli.delimiter {
            self.input.delimiter = delimiter;
        }

        if let Some(ref map) = cli.domain_map {
            self.resolution.domain_map = Some(map.clone());
        }

        if cli.no_plots {
            self.plots.enabled = false;
        }

        if cli.no_aliases {
            self.resolution.aliases.clear();
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delimiter = self.input.delimiter;
        if matches!(delimiter, '@' | '.' | '<' | '>') || delimiter.is_alphanumeric() {
            return Err(ConfigError::InvalidValue {
                field: "input.delimiter".to_string(),
                value: delimiter.to_string(),
                reason: "Delimiter must not be part of an email address".to_string(),
            });
        }

        for (name, (w, h)) in [
            ("plots.sizes.bar", self.plots.sizes.bar),
            ("plots.sizes.pie", self.plots.sizes.pie),
            ("plots.sizes.world", self.plots.sizes.world),
        ] {
            if w == 0 || h == 0 {
                return Err(ConfigError::InvalidValue {
                    field: name.to_string(),
                    value: format!("{w}x{h}"),
                    reason: "Canvas dimensions must be greater than 0".to_string(),
                });
            }
        }

        if self.plots.enabled && self.plots.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "plots.output_dir".to_string(),
            });
        }

        for rule in &self.resolution.aliases {
            if rule.from_domain.is_empty() || rule.to_domain.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "resolution.aliases".to_string(),
                    value: format!("{} -> {}", rule.from_domain, rule.to_domain),
                    reason: "Alias domains must not be empty".to_string(),
                });
            }
            if !rule.to_domain.ends_with(&format!(".{}", rule.to_tld)) {
                return Err(ConfigError::InvalidValue {
                    field: "resolution.aliases".to_string(),
                    value: format!("{} ({})", rule.to_domain, rule.to_tld),
                    reason: "Alias TLD must be the last label of the target domain".to_string(),
                });
            }
        }

        if let Some((domain, _)) = self
            .resolution
            .generic_domains
            .iter()
            .find(|(_, country)| country.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "resolution.generic_domains".to_string(),
                value: domain.clone(),
                reason: "Country name must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Load a flat `domain: country` map from a YAML or JSON file.
pub fn load_domain_map<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let map: BTreeMap<String, String> = read_structured(path.as_ref())?;
    Ok(map
        .into_iter()
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect())
}

fn read_structured<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_string_lossy().to_string(),
            format: "JSON".to_string(),
            reason: e.to_string(),
        })
    } else {
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_string_lossy().to_string(),
            format: "YAML".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    FileRead {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse configuration format
    Parse {
        path: String,
        format: String,
        reason: String,
    },

    /// Invalid configuration value
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Missing required configuration
    MissingRequired { field: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path, source)
            }
            ConfigError::Parse {
                path,
                format,
                reason,
            } => {
                write!(f, "Failed to parse {} file '{}': {}", format, path, reason)
            }
            ConfigError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value '{}' for '{}': {}", value, field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required configuration field: {}", field)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.delimiter, ';');
        assert_eq!(config.plots.output_dir, PathBuf::from("results"));
        assert_eq!(config.plots.export_format, ExportFormat::Png);
        assert_eq!(config.resolution.aliases.len(), 2);
        assert!(config.plots.enabled);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.input.delimiter = '@';
        assert!(config.validate().is_err());

        config.input.delimiter = ',';
        config.plots.sizes.pie = (0, 100);
        assert!(config.validate().is_err());

        config.plots.sizes = PlotSizes::default();
        config
            .resolution
            .aliases
            .push(AliasRule::new("old.de", "new.com", "de"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_loading() {
        unsafe {
            env::set_var("MAILORIGIN_OUTPUT_DIR", "/tmp/plots");
            env::set_var("MAILORIGIN_EXPORT_FORMAT", "svg");
            env::set_var("MAILORIGIN_DELIMITER", ",");
        }

        let config = Config::from_env();
        assert_eq!(config.plots.output_dir, PathBuf::from("/tmp/plots"));
        assert_eq!(config.plots.export_format, ExportFormat::Svg);
        assert_eq!(config.input.delimiter, ',');

        // Clean up
        unsafe {
            env::remove_var("MAILORIGIN_OUTPUT_DIR");
            env::remove_var("MAILORIGIN_EXPORT_FORMAT");
            env::remove_var("MAILORIGIN_DELIMITER");
        }
    }

    #[test]
    fn test_yaml_config_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "input:
  delimiter: ','
resolution:
  generic_domains:
    bar.de: Germany
  tld_countries:
    at: Austria
plots:
  export_format: svg
"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.input.delimiter, ',');
        assert_eq!(config.plots.export_format, ExportFormat::Svg);
        // untouched sections keep defaults
        assert_eq!(config.resolution.aliases.len(), 2);
        assert_eq!(
            config.resolution.generic_domains.get("bar.de").map(String::as_str),
            Some("Germany")
        );
        let tlds = config.resolution.effective_tld_countries();
        assert_eq!(tlds.get("at").map(String::as_str), Some("Austria"));
        assert_eq!(tlds.get("de").map(String::as_str), Some("Germany"));
    }

    #[test]
    fn test_config_alias_rules_are_lowercased() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "resolution:
  aliases:
    - from_domain: PM.me
      to_domain: ProtonMail.com
      to_tld: COM
"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.resolution.aliases,
            vec![AliasRule::new("pm.me", "protonmail.com", "com")]
        );

        let mut book = crate::emails::parse_address_list("a@pm.me", ';');
        let rewritten = crate::aliases::apply_aliases(&mut book, &config.resolution.aliases);
        assert_eq!(rewritten, 1);
        assert_eq!(book.records()[0].domain, "protonmail.com");
    }

    #[test]
    fn test_json_domain_map() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"Bar.DE": "Germany", "uni.edu": "United States"}}"#).unwrap();

        let map = load_domain_map(file.path()).unwrap();
        assert_eq!(map.get("bar.de").map(String::as_str), Some("Germany"));
        assert_eq!(map.len(), 2);

        let mut config = Config::default();
        config
            .resolution
            .generic_domains
            .insert("bar.de".to_string(), "France".to_string());
        config.resolution.domain_map = Some(file.path().to_path_buf());
        let merged = config.resolution.effective_generic_domains().unwrap();
        assert_eq!(merged.get("bar.de").map(String::as_str), Some("Germany"));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/mailorigin.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "input: [unclosed").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
