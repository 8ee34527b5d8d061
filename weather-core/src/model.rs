use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Unit system requested from the provider.
///
/// Only the `units` query parameter and the display labels depend on it;
/// the extracted fields are the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value sent as the `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" | "celsius" | "c" => Ok(UnitSystem::Metric),
            "imperial" | "fahrenheit" | "f" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitSystem::try_from(s)
    }
}

/// Current conditions for one city, as of the last fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub description: String,
    pub icon: String,
    /// Relative humidity, percent. Kept as a float since the provider may send `81.0`.
    pub humidity: f64,
    pub wind_speed: f64,
    /// Sea-level pressure, hPa.
    pub pressure: f64,
}

/// One 3-hour interval of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    /// `YYYY-MM-DD HH:MM:SS`, as sent by the provider.
    pub timestamp: String,
    pub temperature: f64,
    pub description: String,
    pub icon: String,
    pub wind_speed: f64,
}

impl HourlyEntry {
    /// `HH:MM` part of the timestamp.
    pub fn clock(&self) -> &str {
        self.timestamp.get(11..16).unwrap_or("")
    }
}

/// Summary of all intervals sharing one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub min_temp: f64,
    pub max_temp: f64,
    /// Description of the first interval seen for this date.
    pub description: String,
    /// Icon of the first interval seen for this date.
    pub icon: String,
}

impl DailyEntry {
    pub fn weekday(&self) -> Option<Weekday> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .ok()
            .map(|d| d.weekday())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastResult {
    pub hourly: Vec<HourlyEntry>,
    /// Ordered by first occurrence of each date.
    pub daily: Vec<DailyEntry>,
}
