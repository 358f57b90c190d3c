//! Core library for the `wib-weather` CLI.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The OpenWeather client behind the `WeatherSource` trait
//! - Normalization of provider payloads into stable records stamped in WIB (UTC+7)
//! - The fetch pipeline that assembles one `AggregateResponse` per run
//!
//! It is used by `wib-weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod time;

pub use config::Config;
pub use error::WeatherError;
pub use model::{AggregateResponse, AirQuality, CurrentWeather, ForecastEntry, Location};
pub use normalize::{normalize_air_pollution, normalize_current_weather, normalize_forecast};
pub use pipeline::{FetchStrategy, PipelineOptions, WeatherPipeline};
pub use provider::{Endpoint, OpenWeatherClient, WeatherSource};
pub use time::{TIMEZONE_LABEL, to_wib};
