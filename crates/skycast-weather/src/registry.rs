//! Provider registry and startup registration.
//!
//! The registry is built once at startup from the configured provider list
//! and is read-only afterwards. Provider kinds map to constructors through a
//! compile-time factory table; an unknown kind is fatal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use skycast_core::error::{AppError, ConfigError};
use skycast_core::{Config, ProviderConfig};
use tracing::info;

use crate::legend::LegendStore;
use crate::locationforecast::LocationforecastProvider;
use crate::met_eireann::MetEireannWarningProvider;
use crate::provider::{Provider, ProviderInfo};
use crate::region::RegionStore;
use crate::types::WeatherError;

/// Capability filter for registry enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityFilter {
    Any,
    Forecast,
    Warning,
}

impl CapabilityFilter {
    fn matches(self, provider: &dyn Provider) -> bool {
        match self {
            CapabilityFilter::Any => true,
            CapabilityFilter::Forecast => provider.forecast_source().is_some(),
            CapabilityFilter::Warning => provider.warning_source().is_some(),
        }
    }
}

/// Registry of weather providers, iterated in registration order
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Vec<(String, Arc<dyn Provider>)>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Register a provider.
    ///
    /// Returns `true` when the provider was added. Re-registering an existing
    /// name raises when `raise_on_duplicate` is set, and is otherwise a no-op
    /// returning `false`.
    pub fn add(
        &mut self,
        name: &str,
        provider: Arc<dyn Provider>,
        raise_on_duplicate: bool,
    ) -> Result<bool, WeatherError> {
        if self.is_registered(name) {
            if raise_on_duplicate {
                return Err(WeatherError::AlreadyRegistered(name.to_string()));
            }
            return Ok(false);
        }
        self.providers.push((name.to_string(), provider));
        self.index.insert(name.to_string(), self.providers.len() - 1);
        Ok(true)
    }

    /// Get a provider by exact name
    pub fn get(&self, name: &str) -> Result<&Arc<dyn Provider>, WeatherError> {
        self.try_get(name)
            .ok_or_else(|| WeatherError::NotRegistered(name.to_string()))
    }

    pub fn try_get(&self, name: &str) -> Option<&Arc<dyn Provider>> {
        self.index.get(name).map(|&idx| &self.providers[idx].1)
    }

    /// Registered provider names matching the filter, in registration order
    pub fn provider_names(&self, filter: CapabilityFilter) -> Vec<String> {
        self.providers
            .iter()
            .filter(|(_, p)| filter.matches(p.as_ref()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Registered providers matching the filter, in registration order
    pub fn providers(
        &self,
        filter: CapabilityFilter,
    ) -> impl Iterator<Item = (&str, &Arc<dyn Provider>)> {
        self.providers
            .iter()
            .filter(move |(_, p)| filter.matches(p.as_ref()))
            .map(|(name, p)| (name.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn provider_info(cfg: &ProviderConfig) -> Result<ProviderInfo, ConfigError> {
    let tz = match cfg.tz.as_deref() {
        Some(tz) => tz
            .parse::<chrono_tz::Tz>()
            .map_err(|_| ConfigError::Invalid(format!("Unknown timezone '{}'", tz)))?,
        None => chrono_tz::UTC,
    };

    Ok(ProviderInfo {
        name: cfg.id.clone(),
        friendly_name: cfg.name.clone(),
        url: cfg.url.clone(),
        data_url: cfg.data_url.clone(),
        tz,
        countries: cfg.countries(),
        cached_result: cfg.cached_result.clone(),
    })
}

fn required<'a>(
    cfg: &ProviderConfig,
    value: &'a Option<String>,
    setting: &str,
) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .ok_or_else(|| ConfigError::MissingSetting(format!("{}.{}", cfg.id, setting)))
}

/// Construct a provider instance for a configured kind
fn build_provider(
    cfg: &ProviderConfig,
    client: &reqwest::Client,
    legends: &Arc<LegendStore>,
    regions: &Arc<RegionStore>,
) -> Result<Arc<dyn Provider>, ConfigError> {
    let info = provider_info(cfg)?;

    let provider: Arc<dyn Provider> = match cfg.kind.as_str() {
        "locationforecast_met_eireann" => Arc::new(LocationforecastProvider::met_eireann(
            info,
            client.clone(),
            Arc::clone(legends),
            required(cfg, &cfg.latitude, "latitude")?,
            required(cfg, &cfg.longitude, "longitude")?,
            required(cfg, &cfg.from, "from")?,
            required(cfg, &cfg.to, "to")?,
        )),
        "locationforecast_met_norway_classic" => {
            Arc::new(LocationforecastProvider::met_norway_classic(
                info,
                client.clone(),
                Arc::clone(legends),
                required(cfg, &cfg.latitude, "latitude")?,
                required(cfg, &cfg.longitude, "longitude")?,
            ))
        }
        "met_eireann_warning" => Arc::new(MetEireannWarningProvider::new(
            info,
            client.clone(),
            Arc::clone(regions),
        )),
        other => return Err(ConfigError::UnknownProviderKind(other.to_string())),
    };

    Ok(provider)
}

/// Build the registry from configuration.
///
/// Called once at startup; any failure to construct or register a configured
/// provider is fatal.
pub fn build_registry(
    config: &Config,
    legends: Arc<LegendStore>,
    regions: Arc<RegionStore>,
) -> Result<ProviderRegistry, AppError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| AppError::Other(anyhow::anyhow!("Failed to build HTTP client: {e}")))?;

    let mut registry = ProviderRegistry::new();
    for cfg in &config.providers {
        let provider = build_provider(cfg, &client, &legends, &regions)?;
        registry
            .add(&cfg.id, provider, true)
            .map_err(|e| AppError::Other(e.into()))?;
        info!(provider = %cfg.id, kind = %cfg.kind, "Registered weather provider");
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Capability;

    struct StubProvider {
        info: ProviderInfo,
    }

    impl Provider for StubProvider {
        fn info(&self) -> &ProviderInfo {
            &self.info
        }

        fn capability(&self) -> Capability {
            Capability::Forecast
        }
    }

    fn stub(name: &str) -> Arc<dyn Provider> {
        Arc::new(StubProvider {
            info: ProviderInfo {
                name: name.into(),
                friendly_name: name.into(),
                url: "https://example.com".into(),
                data_url: None,
                tz: chrono_tz::UTC,
                countries: vec!["IE".into()],
                cached_result: None,
            },
        })
    }

    #[test]
    fn test_duplicate_registration_raises_by_default() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.add("metA", stub("metA"), true).unwrap());
        let err = registry.add("metA", stub("metA"), true).unwrap_err();
        assert!(matches!(err, WeatherError::AlreadyRegistered(_)));
    }

    #[test]
    fn test_duplicate_registration_noop_when_suppressed() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.add("metA", stub("metA"), false).unwrap());
        assert!(!registry.add("metA", stub("metA"), false).unwrap());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_missing_provider() {
        let registry = ProviderRegistry::new();
        assert!(matches!(
            registry.get("nope").err(),
            Some(WeatherError::NotRegistered(_))
        ));
        assert!(registry.try_get("nope").is_none());
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = ProviderRegistry::new();
        for name in ["zulu", "alpha", "mike"] {
            registry.add(name, stub(name), true).unwrap();
        }
        assert_eq!(
            registry.provider_names(CapabilityFilter::Any),
            vec!["zulu", "alpha", "mike"]
        );
    }

    #[test]
    fn test_capability_filter() {
        let mut registry = ProviderRegistry::new();
        registry.add("metA", stub("metA"), true).unwrap();
        // stub has no capability views wired up
        assert!(registry.provider_names(CapabilityFilter::Forecast).is_empty());
        assert!(registry.provider_names(CapabilityFilter::Warning).is_empty());
        assert_eq!(registry.provider_names(CapabilityFilter::Any).len(), 1);
    }
}
