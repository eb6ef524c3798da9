//! Provider traits and shared provider wiring.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::types::{Forecast, GeoAddress, WeatherError};
use crate::warning::WeatherWarnings;

/// What a provider can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Forecast,
    Warning,
    ForecastWarning,
}

impl Capability {
    pub fn provides_forecast(self) -> bool {
        matches!(self, Capability::Forecast | Capability::ForecastWarning)
    }

    pub fn provides_warning(self) -> bool {
        matches!(self, Capability::Warning | Capability::ForecastWarning)
    }
}

/// Identity and wiring shared by all providers
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// Registration name, e.g. "met_eireann"
    pub name: String,
    /// User friendly name, e.g. "Met Éireann"
    pub friendly_name: String,
    /// Provider home URL
    pub url: String,
    /// Data endpoint URL, if distinct from `url`
    pub data_url: Option<String>,
    /// Provider timezone
    pub tz: Tz,
    /// ISO 3166-1 alpha-2 codes of serviced countries
    pub countries: Vec<String>,
    /// Canned response file, used instead of the network when set
    pub cached_result: Option<PathBuf>,
}

impl ProviderInfo {
    /// Endpoint to fetch data from
    pub fn data_endpoint(&self) -> &str {
        self.data_url.as_deref().unwrap_or(&self.url)
    }

    /// Is the country serviced by this provider?
    pub fn is_country_supported(&self, country: &str) -> bool {
        let country = country.to_uppercase();
        self.countries.iter().any(|c| *c == country)
    }

    /// Read the canned response file, if one is configured.
    ///
    /// Read failures degrade to `None` rather than raising.
    pub fn read_cached_resp(&self) -> Option<String> {
        let path = self.cached_result.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(contents) if !contents.is_empty() => Some(contents),
            Ok(_) => None,
            Err(e) => {
                warn!(provider = %self.name, path = %path.display(),
                    "Failed to read cached response: {e}");
                None
            }
        }
    }
}

impl std::fmt::Display for ProviderInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {:?}, {}", self.name, self.countries, self.url)
    }
}

/// A registered weather provider.
///
/// Capability views expose the forecast/warning faces a provider actually
/// implements; callers never downcast.
pub trait Provider: Send + Sync {
    fn info(&self) -> &ProviderInfo;

    fn capability(&self) -> Capability;

    fn forecast_source(&self) -> Option<&dyn ForecastSource> {
        None
    }

    fn warning_source(&self) -> Option<&dyn WarningSource> {
        None
    }
}

/// A provider that serves location forecasts
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Get the forecast for a geocoded address.
    ///
    /// `start`/`end` bound the forecast window; `None` means from now to the
    /// end of the available forecast.
    async fn get_forecast(
        &self,
        geo_address: &GeoAddress,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Forecast, WeatherError>;
}

/// A provider that serves weather warnings
#[async_trait]
pub trait WarningSource: Send + Sync {
    async fn get_warnings(&self) -> Result<WeatherWarnings, WeatherError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> ProviderInfo {
        ProviderInfo {
            name: "met_eireann".into(),
            friendly_name: "Met Éireann".into(),
            url: "https://www.met.ie".into(),
            data_url: Some("http://metwdb-openaccess.ichec.ie/metno-wdb2ts/locationforecast".into()),
            tz: chrono_tz::Europe::Dublin,
            countries: vec!["IE".into()],
            cached_result: None,
        }
    }

    #[test]
    fn test_country_support_is_case_insensitive() {
        let info = info();
        assert!(info.is_country_supported("IE"));
        assert!(info.is_country_supported("ie"));
        assert!(!info.is_country_supported("NO"));
    }

    #[test]
    fn test_data_endpoint_falls_back_to_url() {
        let mut info = info();
        assert!(info.data_endpoint().contains("ichec.ie"));
        info.data_url = None;
        assert_eq!(info.data_endpoint(), "https://www.met.ie");
    }

    #[test]
    fn test_capability_views() {
        assert!(Capability::Forecast.provides_forecast());
        assert!(!Capability::Forecast.provides_warning());
        assert!(Capability::ForecastWarning.provides_forecast());
        assert!(Capability::ForecastWarning.provides_warning());
        assert!(Capability::Warning.provides_warning());
    }

    #[test]
    fn test_missing_cached_result_degrades() {
        let mut info = info();
        info.cached_result = Some(PathBuf::from("/nonexistent/cache.xml"));
        assert!(info.read_cached_resp().is_none());
    }
}
