//! Weather provider registry and normalization engine for Skycast
//!
//! Aggregates forecasts and warnings from heterogeneous upstream providers
//! and normalizes them into one display-ready data model: provider
//! registration, request fan-out, XML payload parsing, unit and legend/icon
//! resolution, and geocoded-address binding.

pub mod beaufort;
pub mod geocode;
pub mod legend;
pub mod locationforecast;
pub mod met_eireann;
pub mod provider;
pub mod range;
pub mod region;
pub mod registry;
pub mod service;
pub mod types;
pub mod units;
pub mod warning;

pub use beaufort::Beaufort;
pub use geocode::{GeoCodeResult, GeocodeCandidate};
pub use legend::{load_legends, Legend, LegendStore};
pub use locationforecast::LocationforecastProvider;
pub use met_eireann::MetEireannWarningProvider;
pub use provider::{Capability, ForecastSource, Provider, ProviderInfo, WarningSource};
pub use range::{DateRange, RangeArg};
pub use region::{load_regions, Region, RegionStore};
pub use registry::{build_registry, CapabilityFilter, ProviderRegistry};
pub use service::{generate_forecast, generate_warnings};
pub use types::{
    AttribKey, AttribRow, AttribRowType, CellValue, DisplayCell, Forecast, ForecastEntry,
    GeoAddress, ImageData, Location, RowLabel, WeatherError,
};
pub use warning::{AwarenessType, Category, Severity, WarningEntry, WeatherWarnings};

/// Reference data file names under the configured data directory
pub mod data_files {
    /// Base symbol legends
    pub const LEGENDS: &str = "legends.json";
    /// Met Éireann legend patch overlay
    pub const LEGENDS_PATCH: &str = "me-legends.json";
    /// Marine (EMMA) region codes
    pub const MARINE_REGIONS: &str = "emma.json";
    /// Land (FIPS) region codes
    pub const LAND_REGIONS: &str = "fips.json";
}

use std::path::Path;
use std::sync::Arc;

/// Load the legend and region stores from the data directory
pub fn load_reference_data(
    data_dir: &Path,
) -> Result<(Arc<LegendStore>, Arc<RegionStore>), WeatherError> {
    let legends = load_legends(
        &data_dir.join(data_files::LEGENDS),
        &data_dir.join(data_files::LEGENDS_PATCH),
    )?;
    let regions = load_regions(
        &data_dir.join(data_files::MARINE_REGIONS),
        &data_dir.join(data_files::LAND_REGIONS),
    )?;
    Ok((Arc::new(legends), Arc::new(regions)))
}
