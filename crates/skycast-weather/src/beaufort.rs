//! Beaufort wind force scale.
//!
//! Bands follow the Met Éireann published scale,
//! <https://www.met.ie/forecasts/marine-inland-lakes/beaufort-scale>.

use serde::{Deserialize, Serialize};

/// One Beaufort scale force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Beaufort {
    pub force: u8,
}

struct BeaufortBand {
    description: &'static str,
    marine_spec: &'static str,
    land_spec: &'static str,
    wave_height: f64,
    /// Force 12 has no published upper wave height
    wave_height_max: Option<f64>,
    knots_min: f64,
    knots_max: f64,
    mph_min: f64,
    mph_max: f64,
    kmh_min: f64,
    kmh_max: f64,
}

const BANDS: [BeaufortBand; 13] = [
    BeaufortBand {
        description: "Calm",
        marine_spec: "Smoke rises vertically",
        land_spec: "Smoke rises vertically",
        wave_height: 0.0,
        wave_height_max: Some(0.0),
        knots_min: 1.0,
        knots_max: 1.0,
        mph_min: 1.0,
        mph_max: 1.0,
        kmh_min: 1.0,
        kmh_max: 1.0,
    },
    BeaufortBand {
        description: "Light air",
        marine_spec: "Ripples",
        land_spec: "Direction of wind shown by smoke but not by wind vanes",
        wave_height: 0.1,
        wave_height_max: Some(0.1),
        knots_min: 1.0,
        knots_max: 3.0,
        mph_min: 1.0,
        mph_max: 3.0,
        kmh_min: 1.0,
        kmh_max: 5.0,
    },
    BeaufortBand {
        description: "Light breeze",
        marine_spec: "Small wavelets",
        land_spec: "Wind felt on face, leaves rustle, ordinary vanes moved by wind",
        wave_height: 0.2,
        wave_height_max: Some(0.3),
        knots_min: 4.0,
        knots_max: 6.0,
        mph_min: 4.0,
        mph_max: 7.0,
        kmh_min: 6.0,
        kmh_max: 11.0,
    },
    BeaufortBand {
        description: "Gentle breeze",
        marine_spec: "Large wavelets, crests begin to break",
        land_spec: "Leaves and small twigs in constant motion, wind extends light flag",
        wave_height: 0.6,
        wave_height_max: Some(1.0),
        knots_min: 7.0,
        knots_max: 10.0,
        mph_min: 8.0,
        mph_max: 12.0,
        kmh_min: 12.0,
        kmh_max: 19.0,
    },
    BeaufortBand {
        description: "Moderate breeze",
        marine_spec: "Small waves, becoming larger; fairly frequent white horses",
        land_spec: "Raises dust and loose paper, small branches are moved",
        wave_height: 1.0,
        wave_height_max: Some(1.5),
        knots_min: 11.0,
        knots_max: 16.0,
        mph_min: 13.0,
        mph_max: 18.0,
        kmh_min: 20.0,
        kmh_max: 28.0,
    },
    BeaufortBand {
        description: "Fresh breeze",
        marine_spec: "Moderate waves, taking a more pronounced, longer form; many white \
            horses are formed. Chance of some spray",
        land_spec: "Small trees in leaf begin to sway, crested wavelets form on inland waters",
        wave_height: 2.0,
        wave_height_max: Some(2.5),
        knots_min: 17.0,
        knots_max: 21.0,
        mph_min: 19.0,
        mph_max: 24.0,
        kmh_min: 29.0,
        kmh_max: 38.0,
    },
    BeaufortBand {
        description: "Strong breeze",
        marine_spec: "Large waves begin to form; the white foam crests are more extensive \
            everywhere. Some spray",
        land_spec: "Large branches in motion, whistling heard in electricity wires; \
            umbrellas used with difficulty",
        wave_height: 3.0,
        wave_height_max: Some(4.0),
        knots_min: 22.0,
        knots_max: 27.0,
        mph_min: 25.0,
        mph_max: 31.0,
        kmh_min: 39.0,
        kmh_max: 49.0,
    },
    BeaufortBand {
        description: "Near gale",
        marine_spec: "Sea heaps up and white foam from breaking waves begins to be blown \
            in streaks along the direction of the wind",
        land_spec: "Branches, debris on roads, loose objects displaced, hazardous driving \
            conditions for vulnerable road users, minor disruption to transport services",
        wave_height: 4.0,
        wave_height_max: Some(5.5),
        knots_min: 28.0,
        knots_max: 33.0,
        mph_min: 32.0,
        mph_max: 38.0,
        kmh_min: 50.0,
        kmh_max: 61.0,
    },
    BeaufortBand {
        description: "Gale",
        marine_spec: "Moderately high waves of greater length; edges of crests begin to \
            break into spindrift. The foam is blown in well-marked streaks",
        land_spec: "Small branches, debris on roads, minor damage to buildings, damage to \
            power lines, power outages, difficult to walk outdoors, hazardous driving \
            conditions, delays or disruption to some transport services",
        wave_height: 5.5,
        wave_height_max: Some(7.5),
        knots_min: 34.0,
        knots_max: 40.0,
        mph_min: 39.0,
        mph_max: 46.0,
        kmh_min: 62.0,
        kmh_max: 74.0,
    },
    BeaufortBand {
        description: "Strong gale",
        marine_spec: "High waves. Dense streaks of foam along the direction of the wind. \
            Crests of waves begin to topple, tumble and roll over",
        land_spec: "Branches break off, several fallen trees, damage to buildings and \
            power lines, widespread power outages, dangerous conditions, possible threat \
            to life, transport services cancelled, some routes impassable",
        wave_height: 7.0,
        wave_height_max: Some(10.0),
        knots_min: 41.0,
        knots_max: 47.0,
        mph_min: 47.0,
        mph_max: 54.0,
        kmh_min: 75.0,
        kmh_max: 88.0,
    },
    BeaufortBand {
        description: "Storm",
        marine_spec: "Very high waves with long overhanging crests. The resulting foam, \
            in great patches, is blown in dense white streaks along the direction of the \
            wind. The whole surface of the sea takes on a white appearance. Visibility \
            affected",
        land_spec: "Seldom experienced inland, several fallen trees, damage to buildings \
            and power lines, widespread power outages, danger to life, unsafe to be \
            outdoors, transport services cancelled, several routes impassable",
        wave_height: 9.0,
        wave_height_max: Some(12.5),
        knots_min: 48.0,
        knots_max: 55.0,
        mph_min: 55.0,
        mph_max: 63.0,
        kmh_min: 89.0,
        kmh_max: 102.0,
    },
    BeaufortBand {
        description: "Violent storm",
        marine_spec: "Exceptionally high waves. The surface is covered with long white \
            patches of foam lying along the direction of the wind. Everywhere, the edges \
            of the wave crests are being blown into the froth. Visibility affected",
        land_spec: "Rare inland, widespread fallen trees, severe building damage, \
            widespread infrastructure damage and power outages, danger to life, unsafe \
            to be outdoors, isolation of communities, only essential services operating, \
            many routes impassable",
        wave_height: 11.5,
        wave_height_max: Some(16.0),
        knots_min: 56.0,
        knots_max: 63.0,
        mph_min: 64.0,
        mph_max: 72.0,
        kmh_min: 103.0,
        kmh_max: 117.0,
    },
    BeaufortBand {
        description: "Hurricane",
        marine_spec: "The air is filled with foam and spray. Sea completely white with \
            driving spray",
        land_spec: "Very rare inland, life threatening conditions, significant and \
            widespread infrastructure damage, widespread and severe building damage, \
            widespread fallen trees, isolation of communities, disruption to essential \
            services, many routes impassable, transport services cancelled",
        wave_height: 14.0,
        wave_height_max: None,
        knots_min: 64.0,
        knots_max: 64.0,
        mph_min: 73.0,
        mph_max: 73.0,
        kmh_min: 117.0,
        kmh_max: 117.0,
    },
];

impl Beaufort {
    /// Look up a scale entry by force number, 0 to 12
    pub fn from_force(force: i32) -> Option<Self> {
        if (0..=12).contains(&force) {
            Some(Self { force: force as u8 })
        } else {
            None
        }
    }

    /// Look up the scale entry covering a wind speed in km/h
    pub fn from_speed_kmh(speed: f64) -> Self {
        if speed < 1.0 {
            return Self { force: 0 };
        }
        for (force, band) in BANDS.iter().enumerate().skip(1) {
            if speed <= band.kmh_max {
                return Self { force: force as u8 };
            }
        }
        Self { force: 12 }
    }

    fn band(&self) -> &'static BeaufortBand {
        &BANDS[self.force as usize]
    }

    pub fn description(&self) -> &'static str {
        self.band().description
    }

    pub fn marine_spec(&self) -> &'static str {
        self.band().marine_spec
    }

    pub fn land_spec(&self) -> &'static str {
        self.band().land_spec
    }

    /// Probable wave height range in metres; the upper bound is open for
    /// force 12
    pub fn wave_height(&self) -> (f64, Option<f64>) {
        let band = self.band();
        (band.wave_height, band.wave_height_max)
    }

    pub fn speed_range_knots(&self) -> (f64, f64) {
        let band = self.band();
        (band.knots_min, band.knots_max)
    }

    pub fn speed_range_mph(&self) -> (f64, f64) {
        let band = self.band();
        (band.mph_min, band.mph_max)
    }

    pub fn speed_range_kmh(&self) -> (f64, f64) {
        let band = self.band();
        (band.kmh_min, band.kmh_max)
    }

    fn label(&self, min: f64, max: f64, unit: &str, low_open: bool, high_open: bool) -> String {
        if self.force == 0 && low_open {
            format!("Force 0, less than {:.0} {}", max, unit)
        } else if high_open {
            format!("Force {}, {:.0} {} or more", self.force, min, unit)
        } else {
            format!("Force {}, {:.0}-{:.0} {}", self.force, min, max, unit)
        }
    }

    /// Display label with the knots band, e.g. "Force 8, 34-40 knots"
    pub fn label_knots(&self) -> String {
        let (min, max) = self.speed_range_knots();
        self.label(min, max, "knots", true, self.force == 12)
    }

    /// Display label with the mph band, e.g. "Force 8, 39-46 mph"
    pub fn label_mph(&self) -> String {
        let (min, max) = self.speed_range_mph();
        self.label(min, max, "mph", true, self.force == 12)
    }

    /// Display label with the km/h band, e.g. "Force 8, 62-74 km/h"
    pub fn label_kmh(&self) -> String {
        let (min, max) = self.speed_range_kmh();
        self.label(min, max, "km/h", true, self.force == 12)
    }
}
