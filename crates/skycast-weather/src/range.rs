//! Forecast time range arguments.

use chrono::{DateTime, Days, Timelike, Utc};

use crate::types::WeatherError;

/// Forecast window bounds; `None` means unbounded on that side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Named forecast ranges accepted from callers,
/// e.g. "today", "tomorrow+2", "all"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeArg {
    Today,
    Tomorrow,
    TodayPlus(u8),
    TomorrowPlus(u8),
    All,
}

impl RangeArg {
    pub fn from_str(arg: &str) -> Result<Self, WeatherError> {
        let arg = arg.trim().to_lowercase();
        let parsed = match arg.as_str() {
            "today" => Some(RangeArg::Today),
            "tomorrow" => Some(RangeArg::Tomorrow),
            "all" => Some(RangeArg::All),
            _ => match arg.split_once('+') {
                Some(("today", n)) => n.parse().ok().filter(|n| (1..=4).contains(n)).map(RangeArg::TodayPlus),
                Some(("tomorrow", n)) => {
                    n.parse().ok().filter(|n| (1..=3).contains(n)).map(RangeArg::TomorrowPlus)
                }
                _ => None,
            },
        };
        parsed.ok_or_else(|| WeatherError::Parse(format!("Unknown range '{arg}'")))
    }

    pub fn as_str(self) -> String {
        match self {
            RangeArg::Today => "today".to_string(),
            RangeArg::Tomorrow => "tomorrow".to_string(),
            RangeArg::TodayPlus(n) => format!("today+{n}"),
            RangeArg::TomorrowPlus(n) => format!("tomorrow+{n}"),
            RangeArg::All => "all".to_string(),
        }
    }

    /// Resolve to concrete UTC bounds relative to `now`.
    ///
    /// "today" runs from now to next midnight; "tomorrow" from the coming
    /// midnight; "+N" extends the end by N days; "all" is unbounded.
    pub fn as_dates_from(self, now: DateTime<Utc>) -> DateRange {
        if self == RangeArg::All {
            return DateRange::default();
        }

        let start = match self {
            RangeArg::Tomorrow | RangeArg::TomorrowPlus(_) => midnight(next_day(now)),
            _ => now,
        };

        let mut end = midnight(next_day(start));
        let extra = match self {
            RangeArg::TodayPlus(n) | RangeArg::TomorrowPlus(n) => u64::from(n),
            _ => 0,
        };
        if extra > 0 {
            end = end + Days::new(extra);
        }

        DateRange {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn as_dates(self) -> DateRange {
        self.as_dates_from(Utc::now())
    }
}

fn next_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt + Days::new(1)
}

fn midnight(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_hour(0)
        .and_then(|dt| dt.with_minute(0))
        .and_then(|dt| dt.with_second(0))
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(dt)
}
