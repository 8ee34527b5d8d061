//! Normalization of 3-hour interval records into hourly and daily views.
//!
//! The hourly view is capped at [`HOURLY_LIMIT`] entries. The daily view is
//! built from every interval the provider returned, so it may cover a day
//! that the hourly view no longer shows.

use std::collections::HashMap;

use crate::error::{Result, WeatherError};
use crate::model::{DailyEntry, ForecastResult, HourlyEntry};

/// Five days of 3-hour intervals.
pub const HOURLY_LIMIT: usize = 40;

/// One interval record, already lifted out of the provider's JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalRecord {
    pub timestamp: String,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
    pub icon: String,
    pub wind_speed: f64,
}

impl IntervalRecord {
    fn date(&self) -> Result<&str> {
        self.timestamp.get(..10).ok_or_else(|| {
            WeatherError::parse(
                "forecast",
                format!("interval timestamp '{}' has no date part", self.timestamp),
            )
        })
    }
}

pub fn normalize(records: &[IntervalRecord]) -> Result<ForecastResult> {
    Ok(ForecastResult {
        hourly: hourly(records),
        daily: daily(records)?,
    })
}

pub fn hourly(records: &[IntervalRecord]) -> Vec<HourlyEntry> {
    records
        .iter()
        .take(HOURLY_LIMIT)
        .map(|r| HourlyEntry {
            timestamp: r.timestamp.clone(),
            temperature: r.temp,
            description: r.description.clone(),
            icon: r.icon.clone(),
            wind_speed: r.wind_speed,
        })
        .collect()
}

/// Group intervals by calendar date, in order of first appearance.
///
/// Min/max are folded over every interval of the date; description and
/// icon stay those of the first interval seen.
pub fn daily(records: &[IntervalRecord]) -> Result<Vec<DailyEntry>> {
    let mut days: Vec<DailyEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let date = record.date()?;

        match index.get(date).copied() {
            Some(i) => {
                let day = &mut days[i];
                day.min_temp = day.min_temp.min(record.temp_min);
                day.max_temp = day.max_temp.max(record.temp_max);
            }
            None => {
                index.insert(date, days.len());
                days.push(DailyEntry {
                    date: date.to_string(),
                    min_temp: record.temp_min,
                    max_temp: record.temp_max,
                    description: record.description.clone(),
                    icon: record.icon.clone(),
                });
            }
        }
    }

    Ok(days)
}
