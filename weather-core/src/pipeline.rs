//! One fetch cycle: geocode, fetch the three data sources, normalize, assemble.
//!
//! The first failure aborts the run; no partial aggregate is ever built.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{Result, WeatherError},
    model::{AggregateResponse, AirQuality, CurrentWeather, ForecastEntry, Location},
    normalize::{
        DEFAULT_FORECAST_LIMIT, normalize_air_pollution, normalize_current_weather,
        normalize_forecast,
    },
    provider::WeatherSource,
};

/// How the three post-geocode fetches are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// current, then forecast, then air quality; a failure skips the rest.
    #[default]
    Sequential,
    /// All three at once, short-circuiting on the first failure.
    Concurrent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub forecast_limit: usize,
    pub strategy: FetchStrategy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { forecast_limit: DEFAULT_FORECAST_LIMIT, strategy: FetchStrategy::default() }
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self { forecast_limit: config.forecast_limit, strategy: config.fetch_strategy }
    }
}

type Fetched = (CurrentWeather, Vec<ForecastEntry>, AirQuality);

#[derive(Debug)]
pub struct WeatherPipeline<S> {
    source: S,
    options: PipelineOptions,
}

impl<S: WeatherSource> WeatherPipeline<S> {
    pub fn new(source: S, options: PipelineOptions) -> Self {
        Self { source, options }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run a full cycle for `city`.
    pub async fn run(&self, city: &str) -> Result<AggregateResponse> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::InvalidInput("city name must not be empty".into()));
        }

        info!(city, strategy = ?self.options.strategy, "starting fetch cycle");

        let result = self.run_inner(city).await;
        match &result {
            Ok(aggregate) => info!(
                city = %aggregate.location.city,
                country = %aggregate.location.country,
                forecast_slots = aggregate.forecast_24h.len(),
                "fetch cycle complete"
            ),
            Err(e) => warn!(city, error = %e, "fetch cycle aborted"),
        }
        result
    }

    async fn run_inner(&self, city: &str) -> Result<AggregateResponse> {
        let location = self.source.geocode(city).await?;
        debug!(lat = location.lat, lon = location.lon, "geocoded {}", location.city);

        let (current, forecast, air_quality) = match self.options.strategy {
            FetchStrategy::Sequential => self.fetch_sequential(&location).await?,
            FetchStrategy::Concurrent => self.fetch_concurrent(&location).await?,
        };

        Ok(AggregateResponse::new(location, current, forecast, air_quality))
    }

    async fn fetch_sequential(&self, location: &Location) -> Result<Fetched> {
        let (lat, lon) = (location.lat, location.lon);

        let current = normalize_current_weather(&self.source.fetch_current(lat, lon).await?)?;
        let forecast = normalize_forecast(
            &self.source.fetch_forecast(lat, lon).await?,
            self.options.forecast_limit,
        )?;
        let air_quality = normalize_air_pollution(&self.source.fetch_air_quality(lat, lon).await?)?;

        Ok((current, forecast, air_quality))
    }

    async fn fetch_concurrent(&self, location: &Location) -> Result<Fetched> {
        let (lat, lon) = (location.lat, location.lon);

        let current = async {
            let raw = self.source.fetch_current(lat, lon).await?;
            normalize_current_weather(&raw)
        };
        let forecast = async {
            let raw = self.source.fetch_forecast(lat, lon).await?;
            normalize_forecast(&raw, self.options.forecast_limit)
        };
        let air_quality = async {
            let raw = self.source.fetch_air_quality(lat, lon).await?;
            normalize_air_pollution(&raw)
        };

        tokio::try_join!(current, forecast, air_quality)
    }
}
