use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::time::{TIMEZONE_LABEL, WibStamp};

/// Best geocoding match for the requested city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// °C
    pub temp: f64,
    /// °C
    pub feels_like: f64,
    /// %
    pub humidity: u8,
    pub weather: String,
    /// m/s
    pub wind_speed: f64,
    #[serde(flatten)]
    pub stamp: WibStamp,
}

/// One 3-hour forecast slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    #[serde(flatten)]
    pub stamp: WibStamp,
    pub temp: f64,
    pub humidity: u8,
    pub weather: String,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    /// 1 (Good) to 5 (Very Poor).
    pub aqi: u8,
    /// Pollutant name to concentration in μg/m³, in provider order.
    pub components: IndexMap<String, f64>,
    #[serde(flatten)]
    pub stamp: WibStamp,
}

impl AirQuality {
    pub fn label(&self) -> &'static str {
        aqi_label(self.aqi)
    }
}

/// Provider's qualitative name for an AQI level.
pub fn aqi_label(aqi: u8) -> &'static str {
    match aqi {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        5 => "Very Poor",
        _ => "Unknown",
    }
}

/// Everything shown for one fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResponse {
    pub location: Location,
    pub current: CurrentWeather,
    pub forecast_24h: Vec<ForecastEntry>,
    pub air_quality: AirQuality,
    pub timezone: String,
}

impl AggregateResponse {
    pub fn new(
        location: Location,
        current: CurrentWeather,
        forecast_24h: Vec<ForecastEntry>,
        air_quality: AirQuality,
    ) -> Self {
        Self {
            location,
            current,
            forecast_24h,
            air_quality,
            timezone: TIMEZONE_LABEL.to_string(),
        }
    }
}
