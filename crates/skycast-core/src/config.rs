use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the legend/region reference data files
    pub data_dir: PathBuf,

    /// Timeout applied to each upstream provider request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent to upstream providers
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Weather providers to register at startup, in registration order
    #[serde(default, rename = "provider")]
    pub providers: Vec<ProviderConfig>,
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("Skycast/{}", env!("CARGO_PKG_VERSION"))
}

/// Settings block for one upstream weather provider.
///
/// `kind` selects the implementation from the compile-time factory table;
/// the remaining fields carry provider-specific wiring such as the names of
/// the latitude/longitude query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Registration name, e.g. "met_eireann"
    pub id: String,

    /// Implementation selector, e.g. "locationforecast_met_eireann"
    pub kind: String,

    /// User friendly name, e.g. "Met Éireann"
    pub name: String,

    /// Provider home URL
    pub url: String,

    /// Data endpoint URL, if distinct from `url`
    #[serde(default)]
    pub data_url: Option<String>,

    /// Latitude query parameter name
    #[serde(default)]
    pub latitude: Option<String>,

    /// Longitude query parameter name
    #[serde(default)]
    pub longitude: Option<String>,

    /// From date/time query parameter name
    #[serde(default)]
    pub from: Option<String>,

    /// To date/time query parameter name
    #[serde(default)]
    pub to: Option<String>,

    /// Provider timezone identifier, e.g. "Europe/Dublin"
    #[serde(default)]
    pub tz: Option<String>,

    /// Comma-separated ISO 3166-1 alpha-2 codes of serviced countries
    #[serde(default)]
    pub country: Option<String>,

    /// Path to a canned response file, used for deterministic offline replay
    #[serde(default)]
    pub cached_result: Option<PathBuf>,
}

impl ProviderConfig {
    /// Serviced country codes as a list
    pub fn countries(&self) -> Vec<String> {
        self.country
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

impl Config {
    /// Load configuration from the given file path
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: &Path) -> Result<(Self, ValidationResult)> {
        let config = Self::load(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.request_timeout_secs == 0 {
            result.add_error("request_timeout_secs", "Timeout must be greater than 0");
        }

        if self.providers.is_empty() {
            result.add_warning("provider", "No weather providers configured");
        }

        let mut seen_ids: HashSet<&str> = HashSet::new();
        for (idx, provider) in self.providers.iter().enumerate() {
            let field = |name: &str| format!("provider[{}].{}", idx, name);

            if provider.id.is_empty() {
                result.add_error(field("id"), "Provider id must not be empty");
            } else if !seen_ids.insert(provider.id.as_str()) {
                result.add_error(field("id"), format!("Duplicate provider id '{}'", provider.id));
            }

            if provider.kind.is_empty() {
                result.add_error(field("kind"), "Provider kind must not be empty");
            }

            if provider.name.is_empty() {
                result.add_error(field("name"), "Provider name must not be empty");
            }

            self.validate_url(&provider.url, &field("url"), &mut result);
            if let Some(data_url) = &provider.data_url {
                self.validate_url(data_url, &field("data_url"), &mut result);
            }

            if let Some(tz) = &provider.tz {
                if tz.parse::<chrono_tz::Tz>().is_err() {
                    result.add_error(field("tz"), format!("Unknown timezone identifier '{}'", tz));
                }
            }

            if provider.countries().is_empty() {
                result.add_warning(
                    field("country"),
                    "No serviced countries listed; provider will never match warning requests",
                );
            }

            if let Some(cached) = &provider.cached_result {
                if !cached.exists() {
                    result.add_warning(
                        field("cached_result"),
                        format!("Cached response file does not exist: {}", cached.display()),
                    );
                }
            }
        }

        // Reference data directory
        if !self.data_dir.is_dir() {
            result.add_error(
                "data_dir",
                format!("Not a directory: {}", self.data_dir.display()),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }
}
