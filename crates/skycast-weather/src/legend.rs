//! Symbol legend reference data.
//!
//! Legends map forecast symbol codes to icon ids and descriptions. The base
//! legend file is overlaid with a provider patch file, and each record is
//! reachable by multiple alias keys: its numeric `old_id` and one
//! `"{code}_{variant}"` alias per variant.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::types::WeatherError;

/// One legend record.
///
/// A base record and its dark counterpart are connected via `old_id`; dark
/// variant records carry the base `old_id` plus an offset.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Legend {
    #[serde(default)]
    pub desc_en: String,
    #[serde(default)]
    pub desc_nb: String,
    #[serde(default)]
    pub desc_nn: String,
    pub old_id: String,
    #[serde(default)]
    pub variants: Vec<String>,
}

impl Legend {
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }
}

/// Legend records with multi-key access
#[derive(Debug, Default, Clone)]
pub struct LegendStore {
    records: Vec<Legend>,
    keys: HashMap<String, usize>,
}

impl LegendStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_new_keys(&self, keys: &[String]) -> Result<(), WeatherError> {
        for key in keys {
            if self.keys.contains_key(key) {
                return Err(WeatherError::DuplicateLegendKey(key.clone()));
            }
        }
        Ok(())
    }

    /// Add a legend record reachable under the given keys.
    ///
    /// On a duplicate key the store is left untouched.
    pub fn add(&mut self, keys: Vec<String>, legend: Legend) -> Result<(), WeatherError> {
        self.check_new_keys(&keys)?;
        self.records.push(legend);
        let index = self.records.len() - 1;
        for key in keys {
            self.keys.insert(key, index);
        }
        Ok(())
    }

    /// Add alias keys to an existing record.
    ///
    /// On a duplicate key the store is left untouched.
    pub fn add_keys(&mut self, key: &str, new_keys: Vec<String>) -> Result<(), WeatherError> {
        let index = *self
            .keys
            .get(key)
            .ok_or_else(|| WeatherError::UnknownLegend(key.to_string()))?;
        self.check_new_keys(&new_keys)?;
        for n_key in new_keys {
            self.keys.insert(n_key, index);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Legend> {
        self.keys.get(key).map(|&idx| &self.records[idx])
    }

    pub fn key_exists(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn variant_keys(code: &str, legend: &Legend) -> Vec<String> {
    legend
        .variants
        .iter()
        .map(|variant| format!("{}_{}", code, variant))
        .collect()
}

fn read_legend_file(path: &Path) -> Result<BTreeMap<String, Legend>, WeatherError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| {
        WeatherError::ReferenceData(format!("Invalid legend file {}: {}", path.display(), e))
    })
}

/// Load legends from the base file overlaid with the patch file.
///
/// Patch records replace base records with the same code. Codes are
/// lowercased. When a record's `old_id` is already keyed, only its variant
/// aliases are attached to the existing record.
pub fn load_legends(base_path: &Path, patch_path: &Path) -> Result<LegendStore, WeatherError> {
    let mut legends = read_legend_file(base_path)?;
    legends.extend(read_legend_file(patch_path)?);

    let legends: BTreeMap<String, Legend> = legends
        .into_iter()
        .map(|(code, legend)| (code.to_lowercase(), legend))
        .collect();

    let mut store = LegendStore::new();
    for (code, legend) in legends {
        if store.key_exists(&legend.old_id) {
            // already keyed under this id, only attach the variant aliases
            let old_id = legend.old_id.clone();
            store.add_keys(&old_id, variant_keys(&code, &legend))?;
        } else {
            let mut keys = vec![legend.old_id.clone()];
            keys.extend(variant_keys(&code, &legend));
            store.add(keys, legend)?;
        }
    }

    debug!(
        records = store.len(),
        base = %base_path.display(),
        patch = %patch_path.display(),
        "Loaded symbol legends"
    );
    Ok(store)
}
