//! Core library for the `weather` front ends.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the `WeatherProvider` trait
//! - Normalization of 3-hour forecasts into hourly and daily records
//! - Icon decoding
//! - The display shell that runs fetches off the render loop
//!
//! It is used by `weather-cli`, but can also be reused by a GUI shell.

pub mod config;
pub mod error;
pub mod forecast;
pub mod format;
pub mod icon;
pub mod model;
pub mod provider;
pub mod shell;

pub use config::{ClientConfig, Config, Endpoints};
pub use error::WeatherError;
pub use icon::{Bitmap, IconSize};
pub use model::{CurrentWeather, DailyEntry, ForecastResult, HourlyEntry, UnitSystem};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use shell::{Applied, IconPlan, Query, Renderer, RequestId, Shell, WeatherSnapshot};
