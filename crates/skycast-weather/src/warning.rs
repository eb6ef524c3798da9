//! Normalized weather warning data model.
//!
//! CAP-style alerts are folded into [`WarningEntry`] values grouped under a
//! [`WeatherWarnings`] aggregate. Severity and category always resolve to
//! closed enumerations; unresolvable values are a hard parse failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::WeatherError;

const WARNING_ICON_URL: &str = "img/warning_icons/icons8-warning-96-{colour}.png";
const SMALL_CRAFT_ICON_URL: &str = "img/warning_icons/icons8-boat-90-{colour}.png";

/// Severity of a warning.
///
/// Some warning providers encode severity as an "awareness level" composite
/// string, `"{number}; {colour}; {name}"`; that string is the canonical
/// severity source for CAP alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    Extreme,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Minor,
        Severity::Moderate,
        Severity::Severe,
        Severity::Extreme,
    ];

    /// Severity rank, 1 (Minor) to 4 (Extreme)
    pub fn number(self) -> u8 {
        match self {
            Severity::Minor => 1,
            Severity::Moderate => 2,
            Severity::Severe => 3,
            Severity::Extreme => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Severity::Minor => "Minor",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
            Severity::Extreme => "Extreme",
        }
    }

    pub fn colour(self) -> &'static str {
        match self {
            Severity::Minor => "green",
            Severity::Moderate => "yellow",
            Severity::Severe => "orange",
            Severity::Extreme => "red",
        }
    }

    /// Status wording used for display, e.g. "Status Yellow"
    pub fn status(self) -> String {
        let colour = self.colour();
        let mut chars = colour.chars();
        let capitalised = match chars.next() {
            Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        };
        format!("Status {}", capitalised)
    }

    /// The awareness-level wire value for this severity,
    /// e.g. "2; yellow; Moderate"
    pub fn awareness_value(self) -> String {
        format!("{}; {}; {}", self.number(), self.colour(), self.name())
    }

    /// Resolve a severity from an awareness-level composite string
    /// (case-insensitive exact match)
    pub fn from_awareness(value: &str) -> Result<Self, WeatherError> {
        let lowered = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.awareness_value().to_lowercase() == lowered)
            .ok_or_else(|| WeatherError::UnknownAwarenessLevel(value.to_string()))
    }

    /// Resolve a severity from its name (case-insensitive)
    pub fn from_name(value: &str) -> Result<Self, WeatherError> {
        let lowered = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.name().to_lowercase() == lowered)
            .ok_or_else(|| WeatherError::UnknownSeverity(value.to_string()))
    }

    /// General warning icon URL for this severity
    pub fn icon(self) -> String {
        WARNING_ICON_URL.replace("{colour}", self.colour())
    }

    /// Small-craft warning icon URL for this severity
    pub fn small_craft_icon(self) -> String {
        SMALL_CRAFT_ICON_URL.replace("{colour}", self.colour())
    }
}

/// Awareness type of a warning, from the CAP `awareness_type` parameter
/// (`"{number}; {slug}"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwarenessType {
    Wind,
    SnowIce,
    Thunderstorm,
    Fog,
    HighTemperature,
    LowTemperature,
    CoastalEvent,
    ForestFire,
    Avalanches,
    Rain,
    Flooding,
    RainFlood,
    Blight,
    Advisory,
}

impl AwarenessType {
    pub const ALL: [AwarenessType; 14] = [
        AwarenessType::Wind,
        AwarenessType::SnowIce,
        AwarenessType::Thunderstorm,
        AwarenessType::Fog,
        AwarenessType::HighTemperature,
        AwarenessType::LowTemperature,
        AwarenessType::CoastalEvent,
        AwarenessType::ForestFire,
        AwarenessType::Avalanches,
        AwarenessType::Rain,
        AwarenessType::Flooding,
        AwarenessType::RainFlood,
        AwarenessType::Blight,
        AwarenessType::Advisory,
    ];

    pub fn number(self) -> u8 {
        match self {
            AwarenessType::Wind => 1,
            AwarenessType::SnowIce => 2,
            AwarenessType::Thunderstorm => 3,
            AwarenessType::Fog => 4,
            AwarenessType::HighTemperature => 5,
            AwarenessType::LowTemperature => 6,
            AwarenessType::CoastalEvent => 7,
            AwarenessType::ForestFire => 8,
            AwarenessType::Avalanches => 9,
            AwarenessType::Rain => 10,
            AwarenessType::Flooding => 12,
            AwarenessType::RainFlood => 13,
            AwarenessType::Blight => 21,
            AwarenessType::Advisory => 22,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            AwarenessType::Wind => "wind",
            AwarenessType::SnowIce => "snow-ice",
            AwarenessType::Thunderstorm => "thunderstorm",
            AwarenessType::Fog => "fog",
            AwarenessType::HighTemperature => "high-temperature",
            AwarenessType::LowTemperature => "low-temperature",
            AwarenessType::CoastalEvent => "coastalevent",
            AwarenessType::ForestFire => "forest-fire",
            AwarenessType::Avalanches => "avalanches",
            AwarenessType::Rain => "rain",
            AwarenessType::Flooding => "flooding",
            AwarenessType::RainFlood => "rain-flood",
            AwarenessType::Blight => "blight",
            AwarenessType::Advisory => "advisory",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AwarenessType::Wind => "Wind",
            AwarenessType::SnowIce => "Snow/Ice",
            AwarenessType::Thunderstorm => "Thunderstorm",
            AwarenessType::Fog => "Fog",
            AwarenessType::HighTemperature => "High temperature",
            AwarenessType::LowTemperature => "Low temperature",
            AwarenessType::CoastalEvent => "Coastal event",
            AwarenessType::ForestFire => "Forest fire",
            AwarenessType::Avalanches => "Avalanches",
            AwarenessType::Rain => "Rain",
            AwarenessType::Flooding => "Flooding",
            AwarenessType::RainFlood => "Rain/Flood",
            AwarenessType::Blight => "Blight",
            AwarenessType::Advisory => "Advisory",
        }
    }

    /// The wire value for this awareness type, e.g. "1; wind"
    pub fn wire_value(self) -> String {
        format!("{}; {}", self.number(), self.slug())
    }

    /// Resolve an awareness type from its wire value (case-insensitive)
    pub fn from_wire_value(value: &str) -> Result<Self, WeatherError> {
        let lowered = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.wire_value() == lowered)
            .ok_or_else(|| WeatherError::UnknownAwarenessType(value.to_string()))
    }
}

/// Category of a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Marine,
    Environmental,
    Weather,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Marine, Category::Environmental, Category::Weather];

    pub fn name(self) -> &'static str {
        match self {
            Category::Marine => "Marine",
            Category::Environmental => "Environmental",
            Category::Weather => "Weather",
        }
    }

    /// Resolve a category from its name (case-insensitive)
    pub fn from_name(value: &str) -> Result<Self, WeatherError> {
        let lowered = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name().to_lowercase() == lowered)
            .ok_or_else(|| WeatherError::UnknownCategory(value.to_string()))
    }
}

/// One normalized alert.
///
/// Entries are always fully shaped: keys the provider payload did not
/// populate are `None`/empty rather than absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningEntry {
    /// Time of issue
    pub sent: Option<DateTime<Utc>>,
    /// Message type: Alert/Update/Cancel
    pub msg_type: String,
    pub category: Category,
    pub event: String,
    /// Response type: Monitor/Shelter/Evacuate/Prepare/Avoid/AllClear/None
    pub response: String,
    /// Urgency: Immediate/Expected/Future/Past
    pub urgency: String,
    pub severity: Severity,
    /// Certainty: Observed/Likely/Possible/Unlikely
    pub certainty: String,
    /// Expected time of onset
    pub onset: Option<DateTime<Utc>>,
    /// Expected time of expiry
    pub expires: Option<DateTime<Utc>>,
    pub title: String,
    pub description: String,
    pub instruction: String,
    /// e.g. "2; yellow; Moderate"
    pub awareness_level: String,
    /// e.g. "1; wind"
    pub awareness_type: String,
    /// Free-text area description from the alert
    pub area_desc: String,
    /// Resolved display names of affected regions
    pub areas: Vec<String>,
    /// Resolved display icon URL
    pub icon: String,
}

impl WarningEntry {
    pub fn is_category(&self, category: Category) -> bool {
        self.category == category
    }

    pub fn is_marine(&self) -> bool {
        self.is_category(Category::Marine)
    }

    pub fn is_environmental(&self) -> bool {
        self.is_category(Category::Environmental)
    }

    pub fn is_weather(&self) -> bool {
        self.is_category(Category::Weather)
    }

    /// Is this a small craft warning?
    pub fn is_small_craft(&self) -> bool {
        self.event.to_lowercase().contains("small craft")
    }
}

/// Normalized weather warnings for one provider
#[derive(Debug, Clone)]
pub struct WeatherWarnings {
    /// Date/time the warnings were retrieved
    pub created: DateTime<Utc>,
    /// Registration name of the provider
    pub provider_id: String,
    /// Friendly name of the provider
    pub provider: String,
    pub warnings: Vec<WarningEntry>,
    /// Was this built from a cached response?
    pub cached: bool,
}

impl WeatherWarnings {
    pub fn new(provider_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            created: Utc::now(),
            provider_id: provider_id.into(),
            provider: provider.into(),
            warnings: Vec::new(),
            cached: false,
        }
    }

    pub fn add_warning(&mut self, warning: WarningEntry) {
        self.warnings.push(warning);
    }

    /// Warnings of the given category
    pub fn of_category(&self, category: Category) -> impl Iterator<Item = &WarningEntry> {
        self.warnings.iter().filter(move |w| w.category == category)
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.of_category(category).count()
    }

    pub fn marine_count(&self) -> usize {
        self.category_count(Category::Marine)
    }

    pub fn environmental_count(&self) -> usize {
        self.category_count(Category::Environmental)
    }

    pub fn weather_count(&self) -> usize {
        self.category_count(Category::Weather)
    }

    /// Highest severity among warnings of the given category;
    /// `None` when there are no such warnings
    pub fn highest_severity(&self, category: Category) -> Option<Severity> {
        self.of_category(category).map(|w| w.severity).max()
    }

    /// Icon for the highest severity of the given category
    pub fn highest_severity_icon(&self, category: Category) -> Option<String> {
        self.highest_severity(category).map(Severity::icon)
    }
}
