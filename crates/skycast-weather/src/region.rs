//! Warning region reference data.
//!
//! Regions resolve alert geocodes (EMMA marine ids, FIPS land codes) to
//! display names. Both files are merged into one store with uppercased keys.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::types::WeatherError;

/// Display names for one region code
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Region {
    pub short_name: String,
    pub med_name: String,
    pub long_name: String,
}

#[derive(Debug, Deserialize)]
struct RegionFile {
    #[serde(default)]
    codes: HashMap<String, Region>,
}

/// Region records keyed by code
#[derive(Debug, Default, Clone)]
pub struct RegionStore {
    regions: HashMap<String, Region>,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Region> {
        self.regions.get(key)
    }

    pub fn key_exists(&self, key: &str) -> bool {
        self.regions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Load regions from the marine and land region files
pub fn load_regions(marine_path: &Path, land_path: &Path) -> Result<RegionStore, WeatherError> {
    let mut regions = HashMap::new();

    for path in [marine_path, land_path] {
        let contents = std::fs::read_to_string(path)?;
        let file: RegionFile = serde_json::from_str(&contents).map_err(|e| {
            WeatherError::ReferenceData(format!("Invalid region file {}: {}", path.display(), e))
        })?;
        regions.extend(
            file.codes
                .into_iter()
                .map(|(code, region)| (code.to_uppercase(), region)),
        );
    }

    debug!(
        records = regions.len(),
        marine = %marine_path.display(),
        land = %land_path.display(),
        "Loaded warning regions"
    );
    Ok(RegionStore { regions })
}
