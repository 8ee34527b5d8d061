use crate::{
    CurrentWeather, ForecastResult, UnitSystem,
    config::{ClientConfig, Config},
    error::Result,
    icon::{Bitmap, IconSize},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of normalized weather records.
///
/// Every call is network-bound; callers must not await it on a thread that
/// is responsible for redrawing.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str, units: UnitSystem) -> Result<CurrentWeather>;

    async fn fetch_forecast(&self, city: &str, units: UnitSystem) -> Result<ForecastResult>;

    async fn fetch_icon(&self, icon_code: &str, size: IconSize) -> Result<Bitmap>;
}

/// Construct the OpenWeather provider from on-disk config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let client: ClientConfig = config.client_config()?;
    Ok(Box::new(OpenWeatherProvider::new(client)))
}
