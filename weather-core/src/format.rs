//! Human-readable text for the records, shared by every renderer.

use crate::model::{CurrentWeather, DailyEntry, HourlyEntry, UnitSystem};

/// Hourly cells shown: the next 24 hours.
pub const HOURLY_SHOWN: usize = 8;
/// Daily cells shown.
pub const DAILY_SHOWN: usize = 5;

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn current_lines(current: &CurrentWeather, units: UnitSystem) -> Vec<String> {
    let sym = units.temperature_symbol();
    vec![
        format!("{}, {}", current.city, current.country),
        format!("Temperature: {}{sym}", current.temperature),
        format!("Description: {}", capitalize(&current.description)),
        format!("Humidity: {}%", current.humidity),
        format!("Wind Speed: {} {}", current.wind_speed, units.wind_speed_unit()),
        format!("Pressure: {} hPa", current.pressure),
    ]
}

pub fn hourly_cell(entry: &HourlyEntry, units: UnitSystem) -> String {
    format!(
        "{}  {}{}  {}",
        entry.clock(),
        entry.temperature,
        units.temperature_symbol(),
        capitalize(&entry.description)
    )
}

pub fn daily_cell(entry: &DailyEntry, units: UnitSystem) -> String {
    let sym = units.temperature_symbol();
    let day = entry
        .weekday()
        .map(|w| w.to_string())
        .unwrap_or_else(|| entry.date.clone());

    format!(
        "{day}  {}{sym} / {}{sym}  {}",
        entry.min_temp,
        entry.max_temp,
        capitalize(&entry.description)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> CurrentWeather {
        CurrentWeather {
            city: "Paris".into(),
            country: "FR".into(),
            temperature: 11.4,
            description: "light rain".into(),
            icon: "10d".into(),
            humidity: 81.0,
            wind_speed: 4.63,
            pressure: 1012.0,
        }
    }

    #[test]
    fn capitalize_like_a_sentence() {
        assert_eq!(capitalize("light rain"), "Light rain");
        assert_eq!(capitalize("OVERCAST Clouds"), "Overcast clouds");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn current_lines_metric() {
        assert_eq!(
            current_lines(&paris(), UnitSystem::Metric),
            [
                "Paris, FR",
                "Temperature: 11.4°C",
                "Description: Light rain",
                "Humidity: 81%",
                "Wind Speed: 4.63 m/s",
                "Pressure: 1012 hPa",
            ]
        );
    }

    #[test]
    fn fractional_humidity_is_shown_as_sent() {
        let damp = CurrentWeather {
            humidity: 80.5,
            ..paris()
        };
        assert_eq!(current_lines(&damp, UnitSystem::Metric)[3], "Humidity: 80.5%");
    }

    #[test]
    fn units_only_change_labels() {
        let metric = current_lines(&paris(), UnitSystem::Metric);
        let imperial = current_lines(&paris(), UnitSystem::Imperial);

        assert_eq!(imperial[1], "Temperature: 11.4°F");
        assert_eq!(imperial[4], "Wind Speed: 4.63 mph");
        assert_eq!(metric[0], imperial[0]);
        assert_eq!(metric[5], imperial[5]);
    }

    #[test]
    fn hourly_and_daily_cells() {
        let hour = HourlyEntry {
            timestamp: "2024-01-01 09:00:00".into(),
            temperature: -1.5,
            description: "snow".into(),
            icon: "13d".into(),
            wind_speed: 1.0,
        };
        assert_eq!(hourly_cell(&hour, UnitSystem::Metric), "09:00  -1.5°C  Snow");

        let day = DailyEntry {
            date: "2024-01-02".into(),
            min_temp: 3.0,
            max_temp: 6.5,
            description: "broken clouds".into(),
            icon: "04d".into(),
        };
        assert_eq!(daily_cell(&day, UnitSystem::Imperial), "Tue  3°F / 6.5°F  Broken clouds");
    }
}
