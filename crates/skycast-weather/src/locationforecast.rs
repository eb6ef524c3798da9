//! Locationforecast XML providers (Met Éireann, Met Norway classic).
//!
//! Both providers serve the same "weatherdata" time-series schema but differ
//! in which attributes each measurement tag carries. A per-provider
//! attribute map drives the fold from tag attributes into
//! [`ForecastEntry`] fields.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::legend::{Legend, LegendStore};
use crate::provider::{Capability, ForecastSource, Provider, ProviderInfo};
use crate::types::{AttribKey, Forecast, ForecastEntry, GeoAddress, Location, WeatherError};
use crate::units::known_display_unit;

const WEATHER_ICON_URL: &str = "img/weather_icons";
const WIND_DIR_ICON_URL: &str = "img/wind_icons";

/// Offset connecting a dark variant legend id to its base legend id
const DARK_LEGEND_OFFSET: i64 = 100;

const NO_LEGEND_ADDENDUM: &str = "";
const DAY_LEGEND_ADDENDUM: &str = "d";
const NIGHT_LEGEND_ADDENDUM: &str = "n";

/// Cardinal direction names in compass order, 45° apart starting at north
const CARDINAL_DIRECTIONS: [&str; 8] = ["n", "ne", "e", "se", "s", "sw", "w", "nw"];
const ARC_PER_DIR: f64 = 360.0 / CARDINAL_DIRECTIONS.len() as f64;
const HALF_ARC_PER_DIR: f64 = ARC_PER_DIR / 2.0;

/// Where an attribute's display unit comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitHint {
    /// Attribute carries no unit
    None,
    /// The node's `unit` attribute names the unit, with a fallback token
    Node(&'static str),
    /// The unit token is fixed
    Literal(&'static str),
    /// The named attribute both holds the value and is the unit
    Attr(&'static str),
}

/// One mapping from a measurement tag to a forecast attribute
#[derive(Debug, Clone, Copy)]
pub struct ForecastAttrib {
    pub key: AttribKey,
    pub unit: UnitHint,
    /// Attribute of the tag holding the value
    pub value: &'static str,
}

impl ForecastAttrib {
    const fn of_unit_val(key: AttribKey, dflt_unit: &'static str) -> Self {
        Self {
            key,
            unit: UnitHint::Node(dflt_unit),
            value: "value",
        }
    }

    const fn of_attrib_unit(key: AttribKey, attrib: &'static str) -> Self {
        Self {
            key,
            unit: UnitHint::Attr(attrib),
            value: attrib,
        }
    }

    const fn of_no_unit(key: AttribKey, value: &'static str) -> Self {
        Self {
            key,
            unit: UnitHint::None,
            value,
        }
    }
}

/// Mappings for one tag; kept as a tagged variant so single- and
/// multi-attribute tags are distinct at the type level
#[derive(Debug, Clone, Copy)]
pub enum Mappings {
    One(ForecastAttrib),
    Many(&'static [ForecastAttrib]),
}

impl Mappings {
    fn iter(&self) -> impl Iterator<Item = &ForecastAttrib> {
        match self {
            Mappings::One(attrib) => std::slice::from_ref(attrib).iter(),
            Mappings::Many(attribs) => attribs.iter(),
        }
    }
}

/// Attribute map: lowercased measurement tag name to its mappings
pub type AttributeMap = &'static [(&'static str, Mappings)];

/// Met Éireann locationforecast attributes
pub const ME_ATTRIBUTES: AttributeMap = &[
    (
        "temperature",
        Mappings::One(ForecastAttrib::of_unit_val(AttribKey::Temperature, "celsius")),
    ),
    (
        "winddirection",
        Mappings::Many(&[
            ForecastAttrib::of_attrib_unit(AttribKey::WindDir, "deg"),
            ForecastAttrib::of_no_unit(AttribKey::WindCardinal, "name"),
        ]),
    ),
    (
        "windspeed",
        Mappings::One(ForecastAttrib::of_attrib_unit(AttribKey::WindSpeed, "mps")),
    ),
    (
        "windgust",
        Mappings::One(ForecastAttrib::of_attrib_unit(AttribKey::WindGust, "mps")),
    ),
    (
        "humidity",
        Mappings::One(ForecastAttrib::of_unit_val(AttribKey::Humidity, "percent")),
    ),
    (
        "precipitation",
        Mappings::Many(&[
            ForecastAttrib::of_unit_val(AttribKey::Precipitation, "mm"),
            ForecastAttrib {
                key: AttribKey::PrecipitationProb,
                unit: UnitHint::Literal("percent"),
                value: "probability",
            },
        ]),
    ),
    (
        "symbol",
        Mappings::Many(&[
            ForecastAttrib::of_no_unit(AttribKey::Symbol, "number"),
            ForecastAttrib::of_no_unit(AttribKey::AltText, "id"),
        ]),
    ),
];

/// Met Norway locationforecast classic attributes.
///
/// No precipitation probability; classic 2.0 does not provide it.
pub const MN_ATTRIBUTES: AttributeMap = &[
    (
        "temperature",
        Mappings::One(ForecastAttrib::of_unit_val(AttribKey::Temperature, "celsius")),
    ),
    (
        "winddirection",
        Mappings::Many(&[
            ForecastAttrib::of_attrib_unit(AttribKey::WindDir, "deg"),
            ForecastAttrib::of_no_unit(AttribKey::WindCardinal, "name"),
        ]),
    ),
    (
        "windspeed",
        Mappings::Many(&[
            ForecastAttrib::of_attrib_unit(AttribKey::WindSpeed, "mps"),
            ForecastAttrib::of_no_unit(AttribKey::Beaufort, "beaufort"),
        ]),
    ),
    (
        "windgust",
        Mappings::One(ForecastAttrib::of_attrib_unit(AttribKey::WindGust, "mps")),
    ),
    (
        "humidity",
        Mappings::One(ForecastAttrib::of_unit_val(AttribKey::Humidity, "percent")),
    ),
    (
        "precipitation",
        Mappings::One(ForecastAttrib::of_unit_val(AttribKey::Precipitation, "mm")),
    ),
    (
        "symbol",
        Mappings::Many(&[
            ForecastAttrib::of_no_unit(AttribKey::Symbol, "number"),
            ForecastAttrib::of_no_unit(AttribKey::AltText, "id"),
        ]),
    ),
];

fn mappings_for(attributes: AttributeMap, tag: &str) -> Option<&'static Mappings> {
    attributes
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, mappings)| mappings)
}

// -- wire format --------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WeatherData {
    created: Option<String>,
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(rename = "time", default)]
    time: Vec<TimeBlock>,
}

#[derive(Debug, Deserialize)]
struct TimeBlock {
    datatype: Option<String>,
    from: String,
    to: String,
    location: Option<LocationNode>,
}

#[derive(Debug, Deserialize)]
struct LocationNode {
    altitude: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    temperature: Option<MeasureNode>,
    #[serde(rename = "windDirection")]
    wind_direction: Option<MeasureNode>,
    #[serde(rename = "windSpeed")]
    wind_speed: Option<MeasureNode>,
    #[serde(rename = "windGust")]
    wind_gust: Option<MeasureNode>,
    humidity: Option<MeasureNode>,
    precipitation: Option<MeasureNode>,
    symbol: Option<MeasureNode>,
}

impl LocationNode {
    /// Measurement tags in this node, by lowercased tag name
    fn tags(&self) -> [(&'static str, Option<&MeasureNode>); 7] {
        [
            ("temperature", self.temperature.as_ref()),
            ("winddirection", self.wind_direction.as_ref()),
            ("windspeed", self.wind_speed.as_ref()),
            ("windgust", self.wind_gust.as_ref()),
            ("humidity", self.humidity.as_ref()),
            ("precipitation", self.precipitation.as_ref()),
            ("symbol", self.symbol.as_ref()),
        ]
    }
}

/// One measurement tag; the union of attributes any tag may carry
#[derive(Debug, Default, Deserialize)]
struct MeasureNode {
    id: Option<String>,
    unit: Option<String>,
    value: Option<String>,
    deg: Option<String>,
    name: Option<String>,
    mps: Option<String>,
    beaufort: Option<String>,
    probability: Option<String>,
    number: Option<String>,
}

impl MeasureNode {
    fn attr(&self, name: &str) -> Option<&str> {
        match name {
            "id" => self.id.as_deref(),
            "unit" => self.unit.as_deref(),
            "value" => self.value.as_deref(),
            "deg" => self.deg.as_deref(),
            "name" => self.name.as_deref(),
            "mps" => self.mps.as_deref(),
            "beaufort" => self.beaufort.as_deref(),
            "probability" => self.probability.as_deref(),
            "number" => self.number.as_deref(),
            _ => None,
        }
    }
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, WeatherError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    // some feeds omit the offset; treat as UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.and_utc())
        .map_err(|_| WeatherError::Parse(format!("bad timestamp '{raw}'")))
}

fn parse_coord(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.parse::<f64>().ok()).unwrap_or(0.0)
}

/// Fold a locationforecast payload into `forecast`.
///
/// Entries are keyed by period end so instant and period readings sharing an
/// end time merge into one entry; the time series comes out sorted ascending
/// by end. Units are recorded first-write-wins per attribute key. Returns the
/// location embedded in the payload.
pub fn parse_forecast(
    payload: &str,
    forecast: &mut Forecast,
    attributes: AttributeMap,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Location, WeatherError> {
    let data: WeatherData = serde_xml_rs::from_str(payload)
        .map_err(|e| WeatherError::Parse(format!("bad forecast payload: {e}")))?;

    forecast.created = match data.created.as_deref() {
        Some(created) => parse_datetime(created)?,
        None => Utc::now(),
    };

    // all attributes this provider is expected to supply
    forecast.forecast_attribs = attributes
        .iter()
        .flat_map(|(_, mappings)| mappings.iter().map(|a| a.key))
        .collect();
    forecast.forecast_attribs.insert(AttribKey::End);

    let mut units_set: HashSet<AttribKey> = HashSet::new();
    units_set.insert(AttribKey::End);

    let mut location = Location::empty();
    let mut location_set: HashSet<&str> = HashSet::new();

    let mut entries: BTreeMap<DateTime<Utc>, ForecastEntry> = BTreeMap::new();

    let blocks = data.product.map(|p| p.time).unwrap_or_default();
    for block in &blocks {
        if block.datatype.as_deref() != Some("forecast") {
            continue;
        }
        let from_dt = parse_datetime(&block.from)?;
        let to_dt = parse_datetime(&block.to)?;

        // exclude blocks outside the requested window
        if let Some(start) = start {
            if to_dt < start {
                continue;
            }
        }
        if let Some(end) = end {
            if from_dt > end || to_dt > end {
                continue;
            }
        }

        let Some(node) = block.location.as_ref() else {
            continue;
        };

        let entry = entries
            .entry(to_dt)
            .or_insert_with(|| ForecastEntry::of_period(from_dt, to_dt));

        // location fields are first-write-wins per parse
        for (field, raw) in [
            ("altitude", node.altitude.as_deref()),
            ("latitude", node.latitude.as_deref()),
            ("longitude", node.longitude.as_deref()),
        ] {
            if raw.is_some() && !location_set.contains(field) {
                let value = parse_coord(raw);
                match field {
                    "altitude" => location.altitude = value,
                    "latitude" => location.address.lat = value,
                    _ => location.address.lng = value,
                }
                location_set.insert(field);
            }
        }

        for (tag, measure) in node.tags() {
            let (Some(measure), Some(mappings)) = (measure, mappings_for(attributes, tag)) else {
                continue;
            };

            for attrib in mappings.iter() {
                if !units_set.contains(&attrib.key) {
                    let token = match attrib.unit {
                        UnitHint::None => None,
                        UnitHint::Node(dflt) => Some(measure.unit.as_deref().unwrap_or(dflt)),
                        UnitHint::Literal(token) => Some(token),
                        UnitHint::Attr(attr) => Some(attr),
                    };
                    if let Some(display) = token.and_then(known_display_unit) {
                        forecast.units.insert(attrib.key, display.to_string());
                    }
                    units_set.insert(attrib.key);
                }

                let raw = measure.attr(attrib.value).unwrap_or_default();
                entry.set_value(attrib.key, raw)?;
            }
        }
    }

    forecast.time_series = entries.into_values().collect();
    forecast.missing_attribs = forecast
        .forecast_attribs
        .difference(&units_set)
        .copied()
        .collect();

    Ok(location)
}

// -- icon resolution ----------------------------------------------------

/// Icon filename id and day/night addendum for a legend.
///
/// A canonical id above the dark offset is always a night variant; its base
/// id is recovered by subtracting the offset. Otherwise a legend declaring
/// variants is a day icon, and one without has no day/night distinction.
fn id_variant(legend: &Legend) -> Result<(i64, &'static str), WeatherError> {
    let mut old_id: i64 = legend.old_id.parse().map_err(|_| {
        WeatherError::ReferenceData(format!("bad legend id '{}'", legend.old_id))
    })?;
    let mut addendum = if legend.has_variants() {
        DAY_LEGEND_ADDENDUM
    } else {
        NO_LEGEND_ADDENDUM
    };
    if old_id > DARK_LEGEND_OFFSET {
        old_id -= DARK_LEGEND_OFFSET;
        addendum = NIGHT_LEGEND_ADDENDUM;
    }
    Ok((old_id, addendum))
}

/// Resolve the weather icon URL for a symbol code.
///
/// An unknown code is a reference-data mismatch and a hard error.
pub fn weather_icon(legends: &LegendStore, symbol: &str) -> Result<String, WeatherError> {
    let key = symbol.to_lowercase();
    let legend = legends
        .get(&key)
        .ok_or_else(|| WeatherError::UnknownLegend(key.clone()))?;
    let (old_id, addendum) = id_variant(legend)?;
    Ok(format!("{}/{:02}{}.svg", WEATHER_ICON_URL, old_id, addendum))
}

/// Nearest of the 8 cardinal points by degrees, rounding by half arc
pub fn cardinal_from_degrees(degrees: f64) -> &'static str {
    let idx = ((degrees + HALF_ARC_PER_DIR) / ARC_PER_DIR) as usize % CARDINAL_DIRECTIONS.len();
    CARDINAL_DIRECTIONS[idx]
}

/// Resolve the wind direction icon URL from a cardinal name, falling back to
/// the direction in degrees when the name is not one of the 8 points
pub fn wind_dir_icon(name: &str, degrees: f64) -> String {
    let name = name.to_lowercase();
    let name = if CARDINAL_DIRECTIONS.contains(&name.as_str()) {
        name
    } else {
        cardinal_from_degrees(degrees).to_string()
    };
    format!("{}/cardinal-{}.png", WIND_DIR_ICON_URL, name)
}

// -- provider -----------------------------------------------------------

/// Forecast provider for the locationforecast XML schema
pub struct LocationforecastProvider {
    info: ProviderInfo,
    client: reqwest::Client,
    legends: Arc<LegendStore>,
    attributes: AttributeMap,
    lat_q: String,
    lng_q: String,
    from_q: Option<String>,
    to_q: Option<String>,
}

impl LocationforecastProvider {
    /// Met Éireann provider; takes from/to window query parameters
    pub fn met_eireann(
        info: ProviderInfo,
        client: reqwest::Client,
        legends: Arc<LegendStore>,
        lat_q: &str,
        lng_q: &str,
        from_q: &str,
        to_q: &str,
    ) -> Self {
        Self {
            info,
            client,
            legends,
            attributes: ME_ATTRIBUTES,
            lat_q: lat_q.to_string(),
            lng_q: lng_q.to_string(),
            from_q: Some(from_q.to_string()),
            to_q: Some(to_q.to_string()),
        }
    }

    /// Met Norway classic provider; window parameters are not supported
    pub fn met_norway_classic(
        info: ProviderInfo,
        client: reqwest::Client,
        legends: Arc<LegendStore>,
        lat_q: &str,
        lng_q: &str,
    ) -> Self {
        Self {
            info,
            client,
            legends,
            attributes: MN_ATTRIBUTES,
            lat_q: lat_q.to_string(),
            lng_q: lng_q.to_string(),
            from_q: None,
            to_q: None,
        }
    }

    /// Query parameters for a forecast request.
    ///
    /// Window timestamps are expressed in the provider's timezone.
    fn url_params(
        &self,
        lat: f64,
        lng: f64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            (self.lat_q.clone(), lat.to_string()),
            (self.lng_q.clone(), lng.to_string()),
        ];
        for (q, v) in [(&self.from_q, start), (&self.to_q, end)] {
            if let (Some(q), Some(v)) = (q, v) {
                let local = v.with_timezone(&self.info.tz);
                params.push((q.clone(), local.format("%Y-%m-%dT%H:%M").to_string()));
            }
        }
        params
    }

    async fn fetch(&self, params: &[(String, String)]) -> Result<String, WeatherError> {
        let response = self
            .client
            .get(self.info.data_endpoint())
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

impl Provider for LocationforecastProvider {
    fn info(&self) -> &ProviderInfo {
        &self.info
    }

    fn capability(&self) -> Capability {
        Capability::Forecast
    }

    fn forecast_source(&self) -> Option<&dyn ForecastSource> {
        Some(self)
    }
}

#[async_trait]
impl ForecastSource for LocationforecastProvider {
    async fn get_forecast(
        &self,
        geo_address: &GeoAddress,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Forecast, WeatherError> {
        let mut forecast = Forecast::new(geo_address.clone(), self.info.friendly_name.clone());

        let payload = if self.info.cached_result.is_some() {
            let cached = self.info.read_cached_resp();
            forecast.cached = cached.is_some();
            cached
        } else {
            let params = self.url_params(geo_address.lat, geo_address.lng, start, end);
            match self.fetch(&params).await {
                Ok(text) => Some(text),
                Err(e) => {
                    // transport failure degrades to an empty time series
                    warn!(provider = %self.info.name, "Forecast fetch failed: {e}");
                    None
                }
            }
        };

        if let Some(payload) = payload {
            parse_forecast(&payload, &mut forecast, self.attributes, start, end)?;

            for entry in &mut forecast.time_series {
                entry.icon = weather_icon(&self.legends, &entry.symbol)?;
                entry.wind_dir_icon = wind_dir_icon(&entry.wind_cardinal, entry.wind_dir);
            }

            if !forecast.time_series.is_empty() {
                forecast.forecast_attribs.insert(AttribKey::Icon);
                forecast.forecast_attribs.insert(AttribKey::WindDirIcon);
            }
        }

        debug!(
            provider = %self.info.name,
            entries = forecast.time_series.len(),
            cached = forecast.cached,
            "Forecast generated"
        );
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<weatherdata created="2023-08-01T12:00:00Z">
  <product class="pointData">
    <time datatype="forecast" from="2023-08-01T15:00:00Z" to="2023-08-01T15:00:00Z">
      <location altitude="43" latitude="53.6106" longitude="-6.1970">
        <temperature id="TTT" unit="celsius" value="16.1"/>
        <windDirection id="dd" deg="288.3" name="W"/>
        <windSpeed id="ff" mps="5.2"/>
        <windGust id="ff_gust" mps="7.9"/>
        <humidity unit="percent" value="72.9"/>
      </location>
    </time>
    <time datatype="forecast" from="2023-08-01T14:00:00Z" to="2023-08-01T15:00:00Z">
      <location>
        <precipitation unit="mm" value="0.4" probability="32.0"/>
        <symbol id="LightCloud" number="3"/>
      </location>
    </time>
    <time datatype="forecast" from="2023-08-01T16:00:00Z" to="2023-08-01T16:00:00Z">
      <location>
        <temperature id="TTT" unit="celsius" value="15.2"/>
        <windDirection id="dd" deg="22.0" name=""/>
        <windSpeed id="ff" mps="4.1"/>
        <windGust id="ff_gust" mps="6.3"/>
        <humidity unit="percent" value="75.0"/>
      </location>
    </time>
    <time datatype="forecast" from="2023-08-01T15:00:00Z" to="2023-08-01T16:00:00Z">
      <location>
        <precipitation unit="mm" value="0.0" probability="4.0"/>
        <symbol id="Sun" number="1"/>
      </location>
    </time>
  </product>
</weatherdata>"#;

    fn parse(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Forecast {
        let mut forecast = Forecast::new(GeoAddress::empty(), "Met Éireann");
        parse_forecast(SAMPLE, &mut forecast, ME_ATTRIBUTES, start, end).unwrap();
        forecast
    }

    #[test]
    fn test_instant_and_period_merge_by_end_time() {
        let forecast = parse(None, None);
        // 4 blocks sharing 2 end times collapse into 2 entries
        assert_eq!(forecast.time_series.len(), 2);

        let first = &forecast.time_series[0];
        assert_eq!(first.temperature, 16.1);
        assert_eq!(first.precipitation, 0.4);
        assert_eq!(first.precipitation_prob, 32.0);
        assert_eq!(first.symbol, "3");
        assert_eq!(first.alt_text, "LightCloud");
    }

    #[test]
    fn test_time_series_sorted_by_end() {
        let forecast = parse(None, None);
        let ends: Vec<_> = forecast.time_series.iter().map(|e| e.end).collect();
        let mut sorted = ends.clone();
        sorted.sort();
        assert_eq!(ends, sorted);
    }

    #[test]
    fn test_created_from_document() {
        let forecast = parse(None, None);
        assert_eq!(
            forecast.created,
            Utc.with_ymd_and_hms(2023, 8, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_units_recorded_first_write_wins() {
        let forecast = parse(None, None);
        assert_eq!(forecast.get_units(AttribKey::Temperature), "°C");
        assert_eq!(forecast.get_units(AttribKey::WindSpeed), "m/s");
        assert_eq!(forecast.get_units(AttribKey::WindDir), "°");
        assert_eq!(forecast.get_units(AttribKey::Humidity), "%");
        assert_eq!(forecast.get_units(AttribKey::Precipitation), "mm");
        assert_eq!(forecast.get_units(AttribKey::PrecipitationProb), "%");
        // symbol resolves no display unit
        assert_eq!(forecast.get_units(AttribKey::Symbol), "");
    }

    #[test]
    fn test_conflicting_unit_declarations_keep_first() {
        let payload = r#"<?xml version="1.0"?>
<weatherdata created="2023-08-01T12:00:00Z">
  <product>
    <time datatype="forecast" from="2023-08-01T15:00:00Z" to="2023-08-01T15:00:00Z">
      <location><temperature id="TTT" unit="celsius" value="16.1"/></location>
    </time>
    <time datatype="forecast" from="2023-08-01T16:00:00Z" to="2023-08-01T16:00:00Z">
      <location><temperature id="TTT" unit="mm" value="15.2"/></location>
    </time>
  </product>
</weatherdata>"#;
        let mut forecast = Forecast::new(GeoAddress::empty(), "Met Éireann");
        parse_forecast(payload, &mut forecast, ME_ATTRIBUTES, None, None).unwrap();
        // the second block's conflicting declaration is ignored
        assert_eq!(forecast.get_units(AttribKey::Temperature), "°C");
        assert_eq!(forecast.time_series[1].temperature, 15.2);
    }

    #[test]
    fn test_no_missing_attribs_when_all_supplied() {
        let forecast = parse(None, None);
        assert!(forecast.missing_attribs.is_empty());
    }

    #[test]
    fn test_window_filtering() {
        let end = Utc.with_ymd_and_hms(2023, 8, 1, 15, 0, 0).unwrap();
        let forecast = parse(None, Some(end));
        assert_eq!(forecast.time_series.len(), 1);
        assert_eq!(forecast.time_series[0].end, end);

        let start = Utc.with_ymd_and_hms(2023, 8, 1, 15, 30, 0).unwrap();
        let forecast = parse(Some(start), None);
        assert_eq!(forecast.time_series.len(), 1);
        assert_eq!(forecast.time_series[0].temperature, 15.2);
    }

    #[test]
    fn test_location_extracted_first_write() {
        let mut forecast = Forecast::new(GeoAddress::empty(), "Met Éireann");
        let location =
            parse_forecast(SAMPLE, &mut forecast, ME_ATTRIBUTES, None, None).unwrap();
        assert_eq!(location.altitude, 43.0);
        assert_eq!(location.address.lat, 53.6106);
        assert_eq!(location.address.lng, -6.1970);
    }

    #[test]
    fn test_missing_attribs_tracked() {
        // Met Norway map expects a beaufort attribute this payload lacks a
        // probability for
        let mut forecast = Forecast::new(GeoAddress::empty(), "Met Éireann");
        parse_forecast(SAMPLE, &mut forecast, MN_ATTRIBUTES, None, None).unwrap();
        // windSpeed tag present, so beaufort was visited (value defaults 0)
        assert!(!forecast.missing_attribs.contains(&AttribKey::Beaufort));
        assert!(!forecast
            .forecast_attribs
            .contains(&AttribKey::PrecipitationProb));
    }

    #[test]
    fn test_cardinal_rounding_half_arc() {
        assert_eq!(cardinal_from_degrees(0.0), "n");
        assert_eq!(cardinal_from_degrees(22.0), "n");
        assert_eq!(cardinal_from_degrees(23.0), "ne");
        assert_eq!(cardinal_from_degrees(90.0), "e");
        assert_eq!(cardinal_from_degrees(337.4), "nw");
        assert_eq!(cardinal_from_degrees(337.5), "n");
    }

    #[test]
    fn test_wind_dir_icon_prefers_name() {
        assert_eq!(wind_dir_icon("W", 10.0), "img/wind_icons/cardinal-w.png");
        // unrecognized name falls back to degrees
        assert_eq!(wind_dir_icon("", 90.0), "img/wind_icons/cardinal-e.png");
    }

    fn legend(old_id: &str, variants: &[&str]) -> Legend {
        Legend {
            desc_en: String::new(),
            desc_nb: String::new(),
            desc_nn: String::new(),
            old_id: old_id.into(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_legend_addendum_rules() {
        // night offset applies regardless of declared variants
        let (id, addendum) = id_variant(&legend("105", &[])).unwrap();
        assert_eq!((id, addendum), (5, "n"));

        let (id, addendum) = id_variant(&legend("5", &[])).unwrap();
        assert_eq!((id, addendum), (5, ""));

        let (id, addendum) = id_variant(&legend("5", &["day", "night"])).unwrap();
        assert_eq!((id, addendum), (5, "d"));
    }

    #[test]
    fn test_weather_icon_resolution() {
        let mut legends = LegendStore::new();
        legends
            .add(vec!["1".into()], legend("1", &["day", "night"]))
            .unwrap();
        legends.add(vec!["103".into()], legend("103", &[])).unwrap();

        assert_eq!(
            weather_icon(&legends, "1").unwrap(),
            "img/weather_icons/01d.svg"
        );
        assert_eq!(
            weather_icon(&legends, "103").unwrap(),
            "img/weather_icons/03n.svg"
        );
        assert!(matches!(
            weather_icon(&legends, "999").unwrap_err(),
            WeatherError::UnknownLegend(_)
        ));
    }

    #[test]
    fn test_skips_non_forecast_blocks() {
        let payload = r#"<?xml version="1.0"?>
<weatherdata created="2023-08-01T12:00:00Z">
  <product>
    <time datatype="observation" from="2023-08-01T10:00:00Z" to="2023-08-01T10:00:00Z">
      <location><temperature unit="celsius" value="10"/></location>
    </time>
  </product>
</weatherdata>"#;
        let mut forecast = Forecast::new(GeoAddress::empty(), "Test");
        parse_forecast(payload, &mut forecast, ME_ATTRIBUTES, None, None).unwrap();
        assert!(forecast.time_series.is_empty());
    }
}
