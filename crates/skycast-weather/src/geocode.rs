//! Geocode result adapter.
//!
//! Converts the candidate list returned by the external geocoder into a
//! normalized [`GeoCodeResult`] and the [`GeoAddress`] consumed by
//! forecast requests. The geocoder itself is an opaque collaborator; only
//! its response shape is interpreted here.

use serde::Deserialize;

use crate::types::{GeoAddress, WeatherError};

/// Candidate types tried in order of decreasing specificity
const CANDIDATE_PRECEDENCE: [&str; 3] = ["street_address", "postal_code", "locality"];

/// One address component of a geocode candidate
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AddressComponent {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
struct LatLng {
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lng: f64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
struct Geometry {
    #[serde(default)]
    location: LatLng,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
struct PlusCode {
    #[serde(default)]
    global_code: String,
    #[serde(default)]
    compound_code: String,
}

/// One address match returned by the geocoder
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GeocodeCandidate {
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    geometry: Geometry,
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    plus_code: Option<PlusCode>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl GeocodeCandidate {
    fn has_type(&self, wanted: &str) -> bool {
        self.types.iter().any(|t| t == wanted)
    }
}

/// Parse a raw geocoder candidate list
pub fn parse_candidates(json: &str) -> Result<Vec<GeocodeCandidate>, WeatherError> {
    serde_json::from_str(json)
        .map_err(|e| WeatherError::Parse(format!("bad geocode response: {e}")))
}

/// Select the best candidate: the first typed match in decreasing
/// specificity order, falling back to the first candidate
fn select_candidate(candidates: &[GeocodeCandidate]) -> Option<&GeocodeCandidate> {
    for wanted in CANDIDATE_PRECEDENCE {
        if let Some(candidate) = candidates.iter().find(|c| c.has_type(wanted)) {
            return Some(candidate);
        }
    }
    candidates.first()
}

/// Normalized geocode result.
///
/// Component accessors always yield the first matching component and an
/// empty string when none match; partial geocoder results are legitimate,
/// never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoCodeResult {
    pub formatted_address: String,
    pub components: Vec<AddressComponent>,
    pub lat: f64,
    pub lng: f64,
    pub place_id: String,
    pub global_plus_code: String,
    pub compound_plus_code: String,
    pub result_types: Vec<String>,
    pub is_valid: bool,
}

impl GeoCodeResult {
    /// Adapt a candidate list; an empty list yields the invalid sentinel
    pub fn from_candidates(candidates: &[GeocodeCandidate]) -> Self {
        let Some(candidate) = select_candidate(candidates) else {
            return Self::default();
        };
        let plus_code = candidate.plus_code.clone().unwrap_or_default();
        Self {
            formatted_address: candidate.formatted_address.clone(),
            components: candidate.address_components.clone(),
            lat: candidate.geometry.location.lat,
            lng: candidate.geometry.location.lng,
            place_id: candidate.place_id.clone(),
            global_plus_code: plus_code.global_code,
            compound_plus_code: plus_code.compound_code,
            result_types: candidate.types.clone(),
            is_valid: true,
        }
    }

    /// Long name of the first component of the given type, empty if absent
    pub fn component(&self, wanted: &str) -> &str {
        self.components
            .iter()
            .find(|c| c.types.iter().any(|t| t == wanted))
            .map(|c| c.long_name.as_str())
            .unwrap_or("")
    }

    /// Short name of the first component of the given type, empty if absent
    pub fn short_component(&self, wanted: &str) -> &str {
        self.components
            .iter()
            .find(|c| c.types.iter().any(|t| t == wanted))
            .map(|c| c.short_name.as_str())
            .unwrap_or("")
    }

    /// First address line: street number and route
    pub fn line1(&self) -> String {
        let number = self.component("street_number");
        let route = self.component("route");
        match (number.is_empty(), route.is_empty()) {
            (true, _) => route.to_string(),
            (_, true) => number.to_string(),
            _ => format!("{} {}", number, route),
        }
    }

    /// Second address line: sublocality, if any
    pub fn line2(&self) -> &str {
        let sublocality = self.component("sublocality");
        if sublocality.is_empty() {
            self.component("sublocality_level_1")
        } else {
            sublocality
        }
    }

    pub fn locality(&self) -> &str {
        let locality = self.component("locality");
        if locality.is_empty() {
            self.component("postal_town")
        } else {
            locality
        }
    }

    pub fn state(&self) -> &str {
        self.component("administrative_area_level_1")
    }

    pub fn postcode(&self) -> &str {
        self.component("postal_code")
    }

    /// ISO 3166-1 alpha-2 country code
    pub fn country_code(&self) -> &str {
        self.short_component("country")
    }

    /// The address representation consumed by forecast requests
    pub fn to_geo_address(&self) -> GeoAddress {
        GeoAddress {
            formatted_address: self.formatted_address.clone(),
            country: self.country_code().to_string(),
            lat: self.lat,
            lng: self.lng,
            place_id: self.place_id.clone(),
            global_plus_code: self.global_plus_code.clone(),
            is_valid: self.is_valid,
        }
    }
}
