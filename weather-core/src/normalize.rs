//! Mapping of raw provider payloads onto the stable record shapes.
//!
//! Every function here is pure. Payloads that decode but violate the
//! provider's documented contract (empty `weather` array, empty pollution
//! list, AQI outside 1..=5) are rejected as `MalformedPayload` rather than
//! patched with defaults.

use crate::{
    error::{Result, WeatherError},
    model::{AirQuality, CurrentWeather, ForecastEntry},
    provider::{
        Endpoint,
        openweather::{RawCondition, RawForecastItem},
        RawAirPollution, RawCurrentWeather, RawForecast,
    },
    time::WibStamp,
};

/// 8 slots of 3 hours: the next 24 hours.
pub const DEFAULT_FORECAST_LIMIT: usize = 8;

fn first_description(endpoint: Endpoint, weather: &[RawCondition]) -> Result<String> {
    weather
        .first()
        .map(|w| w.description.clone())
        .ok_or_else(|| WeatherError::malformed(endpoint, "empty `weather` array"))
}

pub fn normalize_current_weather(raw: &RawCurrentWeather) -> Result<CurrentWeather> {
    Ok(CurrentWeather {
        temp: raw.main.temp,
        feels_like: raw.main.feels_like,
        humidity: raw.main.humidity,
        weather: first_description(Endpoint::CurrentWeather, &raw.weather)?,
        wind_speed: raw.wind.speed,
        stamp: WibStamp::from_unix(raw.dt),
    })
}

fn normalize_forecast_item(item: &RawForecastItem) -> Result<ForecastEntry> {
    Ok(ForecastEntry {
        stamp: WibStamp::from_unix(item.dt),
        temp: item.main.temp,
        humidity: item.main.humidity,
        weather: first_description(Endpoint::Forecast, &item.weather)?,
        wind_speed: item.wind.speed,
    })
}

/// Keep the first `limit` slots in provider order.
pub fn normalize_forecast(raw: &RawForecast, limit: usize) -> Result<Vec<ForecastEntry>> {
    raw.list.iter().take(limit).map(normalize_forecast_item).collect()
}

/// Only the first (current) sample of the pollution list is used.
pub fn normalize_air_pollution(raw: &RawAirPollution) -> Result<AirQuality> {
    let endpoint = Endpoint::AirPollution;
    let sample = raw
        .list
        .first()
        .ok_or_else(|| WeatherError::malformed(endpoint, "empty `list`"))?;

    if !(1..=5).contains(&sample.main.aqi) {
        return Err(WeatherError::malformed(
            endpoint,
            format!("aqi {} outside 1..=5", sample.main.aqi),
        ));
    }

    Ok(AirQuality {
        aqi: sample.main.aqi,
        components: sample.components.clone(),
        stamp: WibStamp::from_unix(sample.dt),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn current_sample() -> RawCurrentWeather {
        serde_json::from_value(json!({
            "coord": {"lon": 106.8, "lat": -6.2},
            "weather": [{"id": 803, "main": "Clouds", "description": "awan pecah", "icon": "04d"}],
            "base": "stations",
            "main": {"temp": 31.2, "feels_like": 36.4, "temp_min": 30.1, "temp_max": 32.0,
                     "pressure": 1009, "humidity": 62},
            "visibility": 8000,
            "wind": {"speed": 4.12, "deg": 340},
            "dt": 1726000000,
            "sys": {"country": "ID"},
            "timezone": 25200,
            "name": "Jakarta",
            "cod": 200
        }))
        .unwrap()
    }

    fn forecast_sample(len: usize) -> RawForecast {
        let list: Vec<_> = (0..len)
            .map(|i| {
                json!({
                    "dt": 1726000800 + (i as i64) * 10_800,
                    "main": {"temp": 28.0 + i as f64, "feels_like": 30.0, "humidity": 70 + i as u8},
                    "weather": [{"description": format!("slot {i}")}],
                    "wind": {"speed": 2.5},
                    "dt_txt": "ignored"
                })
            })
            .collect();

        serde_json::from_value(json!({"cod": "200", "cnt": len, "list": list})).unwrap()
    }

    fn air_sample(aqi: u8) -> RawAirPollution {
        serde_json::from_value(json!({
            "coord": {"lon": 106.8, "lat": -6.2},
            "list": [
                {"main": {"aqi": aqi},
                 "components": {"co": 647.59, "no2": 21.59, "o3": 68.66, "pm2_5": 42.13},
                 "dt": 1726000000},
                {"main": {"aqi": 1}, "components": {}, "dt": 1726003600}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn current_weather_produces_record_shape() {
        let normalized = normalize_current_weather(&current_sample()).unwrap();

        assert_eq!(
            serde_json::to_value(&normalized).unwrap(),
            json!({
                "temp": 31.2,
                "feels_like": 36.4,
                "humidity": 62,
                "weather": "awan pecah",
                "wind_speed": 4.12,
                "timestamp": 1726000000,
                "datetime_wib": "2024-09-11T03:26:40+07:00"
            })
        );
    }

    #[test]
    fn current_weather_is_pure() {
        let raw = current_sample();
        assert_eq!(normalize_current_weather(&raw).unwrap(), normalize_current_weather(&raw).unwrap());
    }

    #[test]
    fn current_weather_without_conditions_is_malformed() {
        let mut raw = current_sample();
        raw.weather.clear();

        let err = normalize_current_weather(&raw).unwrap_err();
        assert!(matches!(
            err,
            WeatherError::MalformedPayload { endpoint: Endpoint::CurrentWeather, .. }
        ));
    }

    #[test]
    fn forecast_truncates_to_limit_in_order() {
        let raw = forecast_sample(40);
        let entries = normalize_forecast(&raw, DEFAULT_FORECAST_LIMIT).unwrap();

        assert_eq!(entries.len(), 8);
        for (entry, item) in entries.iter().zip(&raw.list) {
            assert_eq!(entry.stamp.timestamp(), item.dt);
        }
        assert!(entries.windows(2).all(|w| w[0].stamp.timestamp() < w[1].stamp.timestamp()));
    }

    #[test]
    fn forecast_returns_min_of_len_and_limit() {
        for (len, limit) in [(0, 8), (3, 8), (8, 8), (12, 5), (5, 0)] {
            let entries = normalize_forecast(&forecast_sample(len), limit).unwrap();
            assert_eq!(entries.len(), len.min(limit), "len={len} limit={limit}");
        }
    }

    #[test]
    fn forecast_does_not_resort() {
        let mut raw = forecast_sample(3);
        raw.list.reverse();

        let entries = normalize_forecast(&raw, 8).unwrap();
        let weather: Vec<_> = entries.iter().map(|e| e.weather.as_str()).collect();
        assert_eq!(weather, ["slot 2", "slot 1", "slot 0"]);
    }

    #[test]
    fn forecast_entry_shape() {
        let entries = normalize_forecast(&forecast_sample(1), 8).unwrap();

        assert_eq!(
            serde_json::to_value(&entries[0]).unwrap(),
            json!({
                "timestamp": 1726000800,
                "datetime_wib": "2024-09-11T03:40:00+07:00",
                "temp": 28.0,
                "humidity": 70,
                "weather": "slot 0",
                "wind_speed": 2.5
            })
        );
    }

    #[test]
    fn forecast_only_checks_kept_slots() {
        let mut raw = forecast_sample(10);
        raw.list[9].weather.clear();

        assert!(normalize_forecast(&raw, 8).is_ok());
        assert!(normalize_forecast(&raw, 10).is_err());
    }

    #[test]
    fn air_pollution_uses_first_sample() {
        let normalized = normalize_air_pollution(&air_sample(3)).unwrap();

        assert_eq!(
            serde_json::to_value(&normalized).unwrap(),
            json!({
                "aqi": 3,
                "components": {"co": 647.59, "no2": 21.59, "o3": 68.66, "pm2_5": 42.13},
                "timestamp": 1726000000,
                "datetime_wib": "2024-09-11T03:26:40+07:00"
            })
        );
    }

    #[test]
    fn air_pollution_keeps_provider_component_order() {
        let body = r#"{"list":[{"main":{"aqi":2},"dt":0,"components":{"co":1.0,"no":2.0,
            "no2":3.0,"o3":4.0,"so2":5.0,"pm2_5":6.0,"pm10":7.0,"nh3":8.0}}]}"#;
        let raw: RawAirPollution = serde_json::from_str(body).unwrap();

        let normalized = normalize_air_pollution(&raw).unwrap();
        let keys: Vec<_> = normalized.components.keys().map(String::as_str).collect();
        assert_eq!(keys, ["co", "no", "no2", "o3", "so2", "pm2_5", "pm10", "nh3"]);
    }

    #[test]
    fn air_pollution_is_pure() {
        let raw = air_sample(2);
        assert_eq!(normalize_air_pollution(&raw).unwrap(), normalize_air_pollution(&raw).unwrap());
    }

    #[test]
    fn air_pollution_rejects_empty_list_and_bad_aqi() {
        let empty = RawAirPollution { list: Vec::new() };
        assert!(normalize_air_pollution(&empty).is_err());

        for aqi in [0, 6] {
            let err = normalize_air_pollution(&air_sample(aqi)).unwrap_err();
            assert!(err.to_string().contains("outside 1..=5"));
        }
    }

    #[test]
    fn stamps_agree_with_raw_dt() {
        let current = normalize_current_weather(&current_sample()).unwrap();
        assert_eq!(current.stamp, WibStamp::from_unix(1726000000));
    }
}
