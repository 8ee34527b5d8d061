use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::ClientConfig,
    error::{Result, WeatherError, truncate_body},
    forecast::{self, IntervalRecord},
    icon::{self, Bitmap, IconSize},
    model::{CurrentWeather, ForecastResult, UnitSystem},
};

use super::WeatherProvider;

const CURRENT: &str = "current weather";
const FORECAST: &str = "forecast";
const ICON: &str = "icon";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    config: ClientConfig,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: ClientConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn icon_url(&self, icon_code: &str) -> String {
        format!("{}/img/wn/{icon_code}@2x.png", self.config.icon_base)
    }

    async fn get_text(
        &self,
        what: &'static str,
        path: &str,
        city: &str,
        units: UnitSystem,
    ) -> Result<String> {
        let url = format!("{}/{path}", self.config.api_base);
        debug!(%url, city, %units, "requesting {what}");

        let request = self.http.get(&url).query(&[
            ("q", city),
            ("appid", self.config.api_key.as_str()),
            ("units", units.as_query()),
        ]);

        let body = self.send(what, request).await?;
        String::from_utf8(body).map_err(|e| WeatherError::parse(what, e))
    }

    async fn send(&self, what: &'static str, request: reqwest::RequestBuilder) -> Result<Vec<u8>> {
        let res = request.send().await.map_err(|source| {
            warn!(error = %source, "{what} request did not complete");
            WeatherError::Network { what, source }
        })?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|source| WeatherError::Network { what, source })?;

        if !status.is_success() {
            warn!(%status, "{what} request rejected");
            return Err(WeatherError::HttpStatus {
                what,
                status,
                body: truncate_body(&String::from_utf8_lossy(&body)),
            });
        }

        Ok(body.to_vec())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, city: &str, units: UnitSystem) -> Result<CurrentWeather> {
        let body = self.get_text(CURRENT, "weather", city, units).await?;
        parse_current(&body)
    }

    async fn fetch_forecast(&self, city: &str, units: UnitSystem) -> Result<ForecastResult> {
        let body = self.get_text(FORECAST, "forecast", city, units).await?;
        parse_forecast(&body)
    }

    async fn fetch_icon(&self, icon_code: &str, size: IconSize) -> Result<Bitmap> {
        let url = self.icon_url(icon_code);
        debug!(%url, "requesting icon");

        let bytes = self.send(ICON, self.http.get(&url)).await?;
        icon::decode_png(icon_code, &bytes, size)
    }
}

/// Map a current-weather body onto [`CurrentWeather`].
pub fn parse_current(body: &str) -> Result<CurrentWeather> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::parse(CURRENT, e))?;

    let weather = first_condition(CURRENT, parsed.weather)?;

    Ok(CurrentWeather {
        city: parsed.name,
        country: parsed.sys.country,
        temperature: parsed.main.temp,
        description: weather.description,
        icon: weather.icon,
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        pressure: parsed.main.pressure,
    })
}

/// Map a 5-day / 3-hour forecast body onto [`ForecastResult`].
pub fn parse_forecast(body: &str) -> Result<ForecastResult> {
    let parsed: OwForecastResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::parse(FORECAST, e))?;

    let records = parsed
        .list
        .into_iter()
        .map(|entry| {
            let weather = first_condition(FORECAST, entry.weather)?;
            Ok(IntervalRecord {
                timestamp: entry.dt_txt,
                temp: entry.main.temp,
                temp_min: entry.main.temp_min,
                temp_max: entry.main.temp_max,
                description: weather.description,
                icon: weather.icon,
                wind_speed: entry.wind.speed,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    forecast::normalize(&records)
}

fn first_condition(what: &'static str, weather: Vec<OwWeather>) -> Result<OwWeather> {
    weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::parse(what, "`weather` array is empty"))
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}
