use std::fmt::Write;

use anyhow::Context;
use clap::ValueEnum;
use wib_weather_core::AggregateResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON document.
    #[default]
    Json,
    /// Short human-readable text.
    Summary,
}

pub fn render(aggregate: &AggregateResponse, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(aggregate).context("Failed to serialize response")
        }
        OutputFormat::Summary => {
            let mut out = String::new();
            write_summary(&mut out, aggregate).context("Failed to format summary")?;
            Ok(out)
        }
    }
}

fn write_summary(out: &mut String, a: &AggregateResponse) -> std::fmt::Result {
    let loc = &a.location;
    writeln!(out, "{}, {} ({:.4}, {:.4})", loc.city, loc.country, loc.lat, loc.lon)?;

    let now = &a.current;
    writeln!(
        out,
        "Now  {}  {:.1}°C (feels {:.1}°C)  {}%  {}  wind {:.1} m/s",
        now.stamp.datetime_wib(),
        now.temp,
        now.feels_like,
        now.humidity,
        now.weather,
        now.wind_speed,
    )?;

    writeln!(out, "Next {} slots", a.forecast_24h.len())?;
    for slot in &a.forecast_24h {
        writeln!(
            out,
            "  {}  {:.1}°C  {}%  {}  wind {:.1} m/s",
            slot.stamp.datetime_wib(),
            slot.temp,
            slot.humidity,
            slot.weather,
            slot.wind_speed,
        )?;
    }

    let air = &a.air_quality;
    writeln!(out, "Air quality {} ({}) at {}", air.aqi, air.label(), air.stamp.datetime_wib())?;
    for (pollutant, value) in &air.components {
        writeln!(out, "  {pollutant:<6} {value:>9.2} μg/m³")?;
    }

    write!(out, "Timezone: {}", a.timezone)
}
