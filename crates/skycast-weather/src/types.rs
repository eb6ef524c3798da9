//! Normalized, display-ready forecast data model.
//!
//! Every provider payload is folded into these types: a [`Forecast`] holding
//! an ordered time series of [`ForecastEntry`] values plus per-attribute
//! display units, bound to the [`GeoAddress`] the request was made for.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::beaufort::Beaufort;

/// Geocoded address a forecast request is made for.
///
/// Produced once per user-entered address via geocoding and immutable after
/// creation. The [`GeoAddress::empty`] sentinel represents an unresolved
/// address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoAddress {
    pub formatted_address: String,
    /// ISO 3166-1 alpha-2 country code
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub place_id: String,
    pub global_plus_code: String,
    pub is_valid: bool,
}

impl GeoAddress {
    /// Sentinel for an address that could not be resolved
    pub fn empty() -> Self {
        Self {
            formatted_address: String::new(),
            country: String::new(),
            lat: 0.0,
            lng: 0.0,
            place_id: String::new(),
            global_plus_code: String::new(),
            is_valid: false,
        }
    }

    /// A valid address from bare coordinates
    pub fn from_lat_lng(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            is_valid: true,
            ..Self::empty()
        }
    }
}

/// Geocoded location embedded in a provider payload, distinct from the
/// request address in that it carries the model altitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: GeoAddress,
    pub altitude: f64,
}

impl Location {
    pub fn empty() -> Self {
        Self {
            address: GeoAddress::empty(),
            altitude: 0.0,
        }
    }
}

/// Keys identifying the attributes of a [`ForecastEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttribKey {
    Start,
    End,
    Temperature,
    WindDir,
    WindCardinal,
    WindDirIcon,
    WindSpeed,
    WindSpeedIcon,
    WindGust,
    Beaufort,
    Humidity,
    Precipitation,
    PrecipitationProb,
    Symbol,
    AltText,
    Icon,
}

impl AttribKey {
    /// Attributes holding floating point values
    pub fn is_float(self) -> bool {
        matches!(
            self,
            AttribKey::Temperature
                | AttribKey::WindDir
                | AttribKey::WindSpeed
                | AttribKey::WindGust
                | AttribKey::Humidity
                | AttribKey::Precipitation
                | AttribKey::PrecipitationProb
        )
    }

    /// Attributes holding integer values
    pub fn is_int(self) -> bool {
        matches!(self, AttribKey::Beaufort)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttribKey::Start => "start",
            AttribKey::End => "end",
            AttribKey::Temperature => "temperature",
            AttribKey::WindDir => "wind_dir",
            AttribKey::WindCardinal => "wind_cardinal",
            AttribKey::WindDirIcon => "wind_dir_icon",
            AttribKey::WindSpeed => "wind_speed",
            AttribKey::WindSpeedIcon => "wind_speed_icon",
            AttribKey::WindGust => "wind_gust",
            AttribKey::Beaufort => "beaufort",
            AttribKey::Humidity => "humidity",
            AttribKey::Precipitation => "precipitation",
            AttribKey::PrecipitationProb => "precipitation_prob",
            AttribKey::Symbol => "symbol",
            AttribKey::AltText => "alt_text",
            AttribKey::Icon => "icon",
        }
    }
}

/// One time slice of a forecast.
///
/// Entries are keyed by `end` so that an instantaneous reading (temperature,
/// wind) and a period reading (precipitation, symbol) sharing an end time
/// merge into the same entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub temperature: f64,
    /// Wind direction in degrees
    pub wind_dir: f64,
    pub wind_cardinal: String,
    pub wind_dir_icon: String,
    pub wind_speed: f64,
    pub wind_speed_icon: String,
    pub wind_gust: f64,
    pub beaufort: i32,
    pub humidity: f64,
    pub precipitation: f64,
    pub precipitation_prob: f64,
    /// Weather symbol legend code
    pub symbol: String,
    pub alt_text: String,
    /// Resolved icon URL
    pub icon: String,
}

impl ForecastEntry {
    /// Create a forecast entry for a period
    pub fn of_period(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            temperature: 0.0,
            wind_dir: 0.0,
            wind_cardinal: String::new(),
            wind_dir_icon: String::new(),
            wind_speed: 0.0,
            wind_speed_icon: String::new(),
            wind_gust: 0.0,
            beaufort: 0,
            humidity: 0.0,
            precipitation: 0.0,
            precipitation_prob: 0.0,
            symbol: String::new(),
            alt_text: String::new(),
            icon: String::new(),
        }
    }

    /// Is this an instant reading? (`start == end`)
    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }

    /// Set an attribute from a raw payload string.
    ///
    /// Numeric attributes default to `0` when the raw value is empty; a
    /// non-empty value that fails to parse is a payload defect.
    pub fn set_value(&mut self, key: AttribKey, raw: &str) -> Result<(), WeatherError> {
        if key.is_float() {
            let value = parse_f64_or_zero(key, raw)?;
            match key {
                AttribKey::Temperature => self.temperature = value,
                AttribKey::WindDir => self.wind_dir = value,
                AttribKey::WindSpeed => self.wind_speed = value,
                AttribKey::WindGust => self.wind_gust = value,
                AttribKey::Humidity => self.humidity = value,
                AttribKey::Precipitation => self.precipitation = value,
                AttribKey::PrecipitationProb => self.precipitation_prob = value,
                _ => unreachable!(),
            }
        } else if key.is_int() {
            self.beaufort = if raw.is_empty() {
                0
            } else {
                raw.parse::<i32>().map_err(|_| {
                    WeatherError::Parse(format!("bad {} value '{}'", key.as_str(), raw))
                })?
            };
        } else {
            let value = raw.to_string();
            match key {
                AttribKey::WindCardinal => self.wind_cardinal = value,
                AttribKey::WindDirIcon => self.wind_dir_icon = value,
                AttribKey::WindSpeedIcon => self.wind_speed_icon = value,
                AttribKey::Symbol => self.symbol = value,
                AttribKey::AltText => self.alt_text = value,
                AttribKey::Icon => self.icon = value,
                // timestamps are set at entry creation, not via the attribute map
                AttribKey::Start | AttribKey::End => {}
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    /// Current value of an attribute as a display cell value
    pub fn value(&self, key: AttribKey) -> CellValue {
        match key {
            AttribKey::Start => CellValue::Time(self.start),
            AttribKey::End => CellValue::Time(self.end),
            AttribKey::Temperature => CellValue::Number(self.temperature),
            AttribKey::WindDir => CellValue::Number(self.wind_dir),
            AttribKey::WindCardinal => CellValue::Text(self.wind_cardinal.clone()),
            AttribKey::WindDirIcon => CellValue::Text(self.wind_dir_icon.clone()),
            AttribKey::WindSpeed => CellValue::Number(self.wind_speed),
            AttribKey::WindSpeedIcon => CellValue::Text(self.wind_speed_icon.clone()),
            AttribKey::WindGust => CellValue::Number(self.wind_gust),
            AttribKey::Beaufort => CellValue::Int(i64::from(self.beaufort)),
            AttribKey::Humidity => CellValue::Number(self.humidity),
            AttribKey::Precipitation => CellValue::Number(self.precipitation),
            AttribKey::PrecipitationProb => CellValue::Number(self.precipitation_prob),
            AttribKey::Symbol => CellValue::Text(self.symbol.clone()),
            AttribKey::AltText => CellValue::Text(self.alt_text.clone()),
            AttribKey::Icon => CellValue::Text(self.icon.clone()),
        }
    }
}

fn parse_f64_or_zero(key: AttribKey, raw: &str) -> Result<f64, WeatherError> {
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .map_err(|_| WeatherError::Parse(format!("bad {} value '{}'", key.as_str(), raw)))
}

/// Image URL plus alternative text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub url: String,
    pub alt_text: String,
}

/// Raw value of a time-series cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Time(DateTime<Utc>),
    Number(f64),
    Int(i64),
    Text(String),
}

/// One rendered cell of an attribute series row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DisplayCell {
    Label(String),
    Value(CellValue),
    Formatted(String),
    Image(ImageData),
}

/// Row rendering behavior for [`Forecast::set_attrib_series`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttribRowType {
    #[default]
    Value,
    Header,
    WeatherIcon,
    WindDirIcon,
    WindSpeedIcon,
}

/// Computes a row label from the forecast, e.g. a provider-specific heading
pub type LabelFn = fn(&Forecast, &AttribRow) -> String;

/// Formats one cell given the raw value, its index and the previous entry's
/// raw value for the same attribute (enables delta/trend formatting)
pub type FormatFn = fn(&Forecast, &AttribRow, &CellValue, usize, Option<&CellValue>) -> String;

/// Row label: fixed text or computed from the forecast
#[derive(Debug, Clone)]
pub enum RowLabel {
    Text(String),
    Compute(LabelFn),
}

/// Display row request for [`Forecast::set_attrib_series`]
#[derive(Debug, Clone)]
pub struct AttribRow {
    pub label: RowLabel,
    pub attribute: AttribKey,
    pub format: Option<FormatFn>,
    pub row_type: AttribRowType,
}

impl AttribRow {
    pub fn new(label: impl Into<String>, attribute: AttribKey) -> Self {
        Self {
            label: RowLabel::Text(label.into()),
            attribute,
            format: None,
            row_type: AttribRowType::Value,
        }
    }

    pub fn with_type(mut self, row_type: AttribRowType) -> Self {
        self.row_type = row_type;
        self
    }

    pub fn with_format(mut self, format: FormatFn) -> Self {
        self.format = Some(format);
        self
    }

    pub fn computed(label: LabelFn, attribute: AttribKey) -> Self {
        Self {
            label: RowLabel::Compute(label),
            attribute,
            format: None,
            row_type: AttribRowType::Value,
        }
    }
}

/// Normalized forecast for one provider.
///
/// Constructed empty per request, populated once by the parser, read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct Forecast {
    /// Date/time the forecast was issued
    pub created: DateTime<Utc>,
    /// Address the forecast is for
    pub address: GeoAddress,
    /// Friendly name of the forecast provider
    pub provider: String,
    /// Display units keyed by attribute
    pub units: HashMap<AttribKey, String>,
    /// Time series, always sorted ascending by entry end time
    pub time_series: Vec<ForecastEntry>,
    /// Derived display rows, one per requested attribute
    pub attrib_series: Vec<Vec<DisplayCell>>,
    /// Was this built from a cached response?
    pub cached: bool,
    /// Attributes this provider is expected to supply
    pub forecast_attribs: HashSet<AttribKey>,
    /// Expected attributes the payload did not actually supply
    pub missing_attribs: HashSet<AttribKey>,
}

impl Forecast {
    pub fn new(address: GeoAddress, provider: impl Into<String>) -> Self {
        Self {
            created: Utc::now(),
            address,
            provider: provider.into(),
            units: HashMap::new(),
            time_series: Vec::new(),
            attrib_series: Vec::new(),
            cached: false,
            forecast_attribs: HashSet::new(),
            missing_attribs: HashSet::new(),
        }
    }

    /// Display unit for the given attribute, empty if not recorded
    pub fn get_units(&self, key: AttribKey) -> &str {
        self.units.get(&key).map(String::as_str).unwrap_or("")
    }

    /// Transpose the time series into display rows.
    ///
    /// One row per requested attribute: first cell is the (possibly
    /// computed) label, remaining cells are one value per time-series entry.
    /// Rows for attributes this forecast did not supply are skipped
    /// entirely, not rendered as empty.
    pub fn set_attrib_series(&mut self, display_items: &[AttribRow]) {
        let mut series = Vec::new();
        for item in display_items {
            if self.missing_attribs.contains(&item.attribute) {
                continue;
            }

            let label = match &item.label {
                RowLabel::Text(text) => text.clone(),
                RowLabel::Compute(f) => f(self, item),
            };
            let mut row = vec![DisplayCell::Label(label)];

            let mut prev_value: Option<CellValue> = None;
            for (idx, entry) in self.time_series.iter().enumerate() {
                let value = entry.value(item.attribute);
                let cell = if let Some(format) = item.format {
                    DisplayCell::Formatted(format(self, item, &value, idx, prev_value.as_ref()))
                } else {
                    match item.row_type {
                        AttribRowType::WeatherIcon => DisplayCell::Image(ImageData {
                            url: entry.icon.clone(),
                            alt_text: entry.alt_text.clone(),
                        }),
                        AttribRowType::WindDirIcon => DisplayCell::Image(ImageData {
                            url: entry.wind_dir_icon.clone(),
                            alt_text: entry.wind_cardinal.clone(),
                        }),
                        AttribRowType::WindSpeedIcon => DisplayCell::Image(ImageData {
                            url: entry.wind_speed_icon.clone(),
                            alt_text: Beaufort::from_force(entry.beaufort)
                                .map(|b| b.label_kmh())
                                .unwrap_or_default(),
                        }),
                        _ => DisplayCell::Value(value.clone()),
                    }
                };
                row.push(cell);
                prev_value = Some(value);
            }

            series.push(row);
        }
        self.attrib_series = series;
    }
}

/// Weather engine errors.
///
/// Transport failures are recovered locally by providers (degraded result);
/// reference-data mismatches propagate as hard errors.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Legend '{0}' not found")]
    UnknownLegend(String),

    #[error("Legend key '{0}' already exists")]
    DuplicateLegendKey(String),

    #[error("Region '{0}' not found")]
    UnknownRegion(String),

    #[error("No severity for awareness level '{0}'")]
    UnknownAwarenessLevel(String),

    #[error("No severity named '{0}'")]
    UnknownSeverity(String),

    #[error("No category named '{0}'")]
    UnknownCategory(String),

    #[error("No awareness type for '{0}'")]
    UnknownAwarenessType(String),

    #[error("Provider '{0}' already registered")]
    AlreadyRegistered(String),

    #[error("Provider '{0}' not registered")]
    NotRegistered(String),

    #[error("Reference data error: {0}")]
    ReferenceData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry_at(hour: u32) -> ForecastEntry {
        let end = Utc.with_ymd_and_hms(2023, 8, 1, hour, 0, 0).unwrap();
        ForecastEntry::of_period(end, end)
    }

    #[test]
    fn test_instant_entry() {
        let entry = entry_at(6);
        assert!(entry.is_instant());
    }

    #[test]
    fn test_period_entry() {
        let start = Utc.with_ymd_and_hms(2023, 8, 1, 6, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 8, 1, 12, 0, 0).unwrap();
        let entry = ForecastEntry::of_period(start, end);
        assert!(!entry.is_instant());
    }

    #[test]
    fn test_set_value_float_defaults_to_zero() {
        let mut entry = entry_at(6);
        entry.set_value(AttribKey::Temperature, "").unwrap();
        assert_eq!(entry.temperature, 0.0);
        entry.set_value(AttribKey::Temperature, "16.1").unwrap();
        assert_eq!(entry.temperature, 16.1);
    }

    #[test]
    fn test_set_value_bad_float_is_error() {
        let mut entry = entry_at(6);
        assert!(entry.set_value(AttribKey::WindSpeed, "fresh").is_err());
    }

    #[test]
    fn test_attrib_series_skips_missing() {
        let mut forecast = Forecast::new(GeoAddress::empty(), "Test");
        let mut entry = entry_at(6);
        entry.temperature = 12.5;
        forecast.time_series.push(entry);
        forecast.missing_attribs.insert(AttribKey::PrecipitationProb);

        forecast.set_attrib_series(&[
            AttribRow::new("Temperature", AttribKey::Temperature),
            AttribRow::new("Precipitation Probability", AttribKey::PrecipitationProb),
        ]);

        assert_eq!(forecast.attrib_series.len(), 1);
        assert_eq!(
            forecast.attrib_series[0][0],
            DisplayCell::Label("Temperature".into())
        );
        assert_eq!(
            forecast.attrib_series[0][1],
            DisplayCell::Value(CellValue::Number(12.5))
        );
    }

    #[test]
    fn test_attrib_series_format_sees_previous_value() {
        fn trend(
            _f: &Forecast,
            _r: &AttribRow,
            value: &CellValue,
            _idx: usize,
            prev: Option<&CellValue>,
        ) -> String {
            match (value, prev) {
                (CellValue::Number(v), Some(CellValue::Number(p))) if v > p => format!("{v}↑"),
                (CellValue::Number(v), Some(CellValue::Number(p))) if v < p => format!("{v}↓"),
                (CellValue::Number(v), _) => format!("{v}"),
                _ => String::new(),
            }
        }

        let mut forecast = Forecast::new(GeoAddress::empty(), "Test");
        for (hour, temp) in [(6, 10.0), (7, 12.0), (8, 11.0)] {
            let mut entry = entry_at(hour);
            entry.temperature = temp;
            forecast.time_series.push(entry);
        }

        forecast.set_attrib_series(&[
            AttribRow::new("Temperature", AttribKey::Temperature).with_format(trend)
        ]);

        let row = &forecast.attrib_series[0];
        assert_eq!(row[1], DisplayCell::Formatted("10".into()));
        assert_eq!(row[2], DisplayCell::Formatted("12↑".into()));
        assert_eq!(row[3], DisplayCell::Formatted("11↓".into()));
    }

    #[test]
    fn test_empty_address_sentinel() {
        let addr = GeoAddress::empty();
        assert!(!addr.is_valid);
        assert_eq!(addr.lat, 0.0);
        assert!(addr.formatted_address.is_empty());
    }
}
