use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::Result, model::Location};

pub mod openweather;

pub use openweather::{OpenWeatherClient, RawAirPollution, RawCurrentWeather, RawForecast};

/// The four upstream calls one pipeline run can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Geocode,
    CurrentWeather,
    Forecast,
    AirPollution,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Geocode => "geocoding",
            Endpoint::CurrentWeather => "current weather",
            Endpoint::Forecast => "forecast",
            Endpoint::AirPollution => "air pollution",
        }
    }

    /// Path below the provider base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Geocode => "/geo/1.0/direct",
            Endpoint::CurrentWeather => "/data/2.5/weather",
            Endpoint::Forecast => "/data/2.5/forecast",
            Endpoint::AirPollution => "/data/2.5/air_pollution",
        }
    }

    /// Whether the call takes `units` and `lang`.
    pub fn is_localized(&self) -> bool {
        matches!(self, Endpoint::CurrentWeather | Endpoint::Forecast)
    }

    pub const fn all() -> &'static [Endpoint] {
        &[
            Endpoint::Geocode,
            Endpoint::CurrentWeather,
            Endpoint::Forecast,
            Endpoint::AirPollution,
        ]
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of raw provider data. The pipeline only talks to this trait.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Resolve a free-text city name to its single best match.
    async fn geocode(&self, city: &str) -> Result<Location>;

    async fn fetch_current(&self, lat: f64, lon: f64) -> Result<RawCurrentWeather>;

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<RawForecast>;

    async fn fetch_air_quality(&self, lat: f64, lon: f64) -> Result<RawAirPollution>;
}
