//! Aggregation façade over the provider registry.
//!
//! Fans a request out to one or many registered providers, sequentially in
//! registration order, and collects their normalized results. Providers own
//! their degraded-result behavior; the façade does not catch or retry.

use tracing::info;

use crate::range::DateRange;
use crate::registry::{CapabilityFilter, ProviderRegistry};
use crate::types::{Forecast, GeoAddress, WeatherError};
use crate::warning::WeatherWarnings;

/// Generate forecasts for an address, one per queried provider.
///
/// With `provider` set only that provider is queried; otherwise every
/// forecast-capable provider servicing the address country is, in
/// registration order. Results are never merged across providers.
pub async fn generate_forecast(
    registry: &ProviderRegistry,
    geo_address: &GeoAddress,
    range: DateRange,
    provider: Option<&str>,
) -> Result<Vec<Forecast>, WeatherError> {
    let names = match provider {
        Some(name) => vec![name.to_string()],
        None => registry
            .providers(CapabilityFilter::Forecast)
            .filter(|(_, p)| p.info().is_country_supported(&geo_address.country))
            .map(|(name, _)| name.to_string())
            .collect(),
    };

    let mut forecasts = Vec::with_capacity(names.len());
    for name in &names {
        let provider = registry.get(name)?;
        let source = provider
            .forecast_source()
            .ok_or_else(|| WeatherError::NotRegistered(name.clone()))?;
        forecasts.push(source.get_forecast(geo_address, range.start, range.end).await?);
    }

    info!(
        providers = names.len(),
        country = %geo_address.country,
        "Generated forecasts"
    );
    Ok(forecasts)
}

/// Generate weather warnings for a country, one result per queried provider.
///
/// With `provider` set only that provider is queried, and only when it is
/// warning-capable; otherwise every warning-capable provider servicing the
/// country is, in registration order.
pub async fn generate_warnings(
    registry: &ProviderRegistry,
    country: &str,
    provider: Option<&str>,
) -> Result<Vec<WeatherWarnings>, WeatherError> {
    let mut names = registry.provider_names(CapabilityFilter::Warning);
    if let Some(name) = provider {
        if names.iter().any(|n| n == name) {
            names = vec![name.to_string()];
        }
    }

    let mut warnings = Vec::new();
    for name in &names {
        let provider = registry.get(name)?;
        if !provider.info().is_country_supported(country) {
            continue;
        }
        let source = provider
            .warning_source()
            .ok_or_else(|| WeatherError::NotRegistered(name.clone()))?;
        warnings.push(source.get_warnings().await?);
    }

    info!(providers = warnings.len(), country, "Generated warnings");
    Ok(warnings)
}
