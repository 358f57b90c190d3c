use std::{fmt, time::Duration};

use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, Request, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::{Result, WeatherError},
    model::Location,
};

use super::{Endpoint, WeatherSource};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const UNITS: &str = "metric";
const LANG: &str = "id";

type Query = Vec<(&'static str, String)>;

/// HTTP client for the OpenWeather geocoding, weather, forecast and
/// air-pollution endpoints.
#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: Client::new(),
        }
    }

    /// Build a client from configuration; fails when no API key is available.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?;

        Ok(Self::new(api_key.to_owned())
            .with_base_url(&config.base_url)
            .with_timeout(Duration::from_secs(config.timeout_secs)))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn geocode_query(&self, city: &str) -> Query {
        vec![
            ("q", city.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ]
    }

    fn coords_query(&self, endpoint: Endpoint, lat: f64, lon: f64) -> Query {
        let mut query = vec![
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", self.api_key.clone()),
        ];

        if endpoint.is_localized() {
            query.push(("units", UNITS.to_string()));
            query.push(("lang", LANG.to_string()));
        }

        query
    }

    fn build_request(&self, endpoint: Endpoint, query: &Query) -> Result<Request> {
        let url = format!("{}{}", self.base_url, endpoint.path());

        self.http
            .get(url)
            .query(query)
            .timeout(self.timeout)
            .build()
            .map_err(|source| WeatherError::transport(endpoint, source))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint, query: Query) -> Result<T> {
        let request = self.build_request(endpoint, &query)?;
        debug!(%endpoint, path = endpoint.path(), "sending request");

        let res = self
            .http
            .execute(request)
            .await
            .map_err(|source| WeatherError::transport(endpoint, source))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::transport(endpoint, source))?;

        if status != StatusCode::OK {
            warn!(%endpoint, status = status.as_u16(), "request rejected");
            return Err(WeatherError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::malformed(endpoint, e.to_string()))
    }
}

impl fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn geocode(&self, city: &str) -> Result<Location> {
        let hits: Vec<RawGeocodeHit> =
            self.get_json(Endpoint::Geocode, self.geocode_query(city)).await?;

        hits.into_iter()
            .next()
            .map(Location::from)
            .ok_or_else(|| WeatherError::LocationNotFound { city: city.to_string() })
    }

    async fn fetch_current(&self, lat: f64, lon: f64) -> Result<RawCurrentWeather> {
        let endpoint = Endpoint::CurrentWeather;
        self.get_json(endpoint, self.coords_query(endpoint, lat, lon)).await
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<RawForecast> {
        let endpoint = Endpoint::Forecast;
        self.get_json(endpoint, self.coords_query(endpoint, lat, lon)).await
    }

    async fn fetch_air_quality(&self, lat: f64, lon: f64) -> Result<RawAirPollution> {
        let endpoint = Endpoint::AirPollution;
        self.get_json(endpoint, self.coords_query(endpoint, lat, lon)).await
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawGeocodeHit {
    name: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

impl From<RawGeocodeHit> for Location {
    fn from(hit: RawGeocodeHit) -> Self {
        Location { city: hit.name, country: hit.country, lat: hit.lat, lon: hit.lon }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCondition {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawWind {
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCurrentMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
}

/// `/data/2.5/weather` body, reduced to what normalization reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCurrentWeather {
    pub dt: i64,
    pub main: RawCurrentMain,
    pub weather: Vec<RawCondition>,
    pub wind: RawWind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawForecastMain {
    pub temp: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawForecastItem {
    pub dt: i64,
    pub main: RawForecastMain,
    pub weather: Vec<RawCondition>,
    pub wind: RawWind,
}

/// `/data/2.5/forecast` body. `list` is chronological, 3-hour steps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawForecast {
    pub list: Vec<RawForecastItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawAqi {
    pub aqi: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawAirSample {
    pub dt: i64,
    pub main: RawAqi,
    pub components: IndexMap<String, f64>,
}

/// `/data/2.5/air_pollution` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawAirPollution {
    pub list: Vec<RawAirSample>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
