//! Measurement units and speed conversion.

use crate::types::WeatherError;

/// Wind speed units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Units {
    Mps,
    Kph,
    Knots,
    Mph,
}

impl Units {
    pub const ALL: [Units; 4] = [Units::Mps, Units::Kph, Units::Knots, Units::Mph];

    pub fn as_str(self) -> &'static str {
        match self {
            Units::Mps => "m/s",
            Units::Kph => "km/h",
            Units::Knots => "kn",
            Units::Mph => "mph",
        }
    }

    pub fn from_str(unit: &str) -> Result<Self, WeatherError> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == unit)
            .ok_or_else(|| WeatherError::Parse(format!("Unknown unit: {unit}")))
    }

    /// Conversion factor from this unit to m/s
    fn to_mps_factor(self) -> f64 {
        match self {
            Units::Mps => 1.0,
            Units::Kph => 1.0 / 3.6,
            Units::Knots => 1.0 / 1.94384,
            Units::Mph => 1.0 / 2.23694,
        }
    }
}

/// Convert a speed between units
pub fn speed_conversion(value: f64, from_unit: Units, to_unit: Units) -> f64 {
    if from_unit == to_unit {
        return value;
    }
    value * from_unit.to_mps_factor() / to_unit.to_mps_factor()
}

/// Display form of a payload unit token, if one is defined.
///
/// Tokens such as symbol ids resolve as unit sources but have no display
/// form; those yield `None`.
pub fn known_display_unit(raw: &str) -> Option<&'static str> {
    Some(match raw {
        "celsius" => "°C",
        "percent" => "%",
        "mps" => "m/s",
        "hPa" => "hPa",
        "mm" => "mm",
        "deg" => "°",
        _ => return None,
    })
}

/// Display form of a payload unit token.
///
/// Tokens with no display mapping are passed through unchanged.
pub fn display_unit(raw: &str) -> &str {
    known_display_unit(raw).unwrap_or(raw)
}
