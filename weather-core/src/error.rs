use thiserror::Error;

use crate::provider::Endpoint;

/// Everything that can stop a pipeline run (or, for `MissingApiKey`, startup).
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "No OpenWeather API key configured.\n\
         Hint: export OPENWEATHER_API_KEY or run `wib-weather configure`."
    )]
    MissingApiKey,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Location not found: {city}")]
    LocationNotFound { city: String },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status { endpoint: Endpoint, status: u16, body: String },

    #[error("Failed to send {endpoint} request")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed {endpoint} payload: {detail}")]
    MalformedPayload { endpoint: Endpoint, detail: String },
}

impl WeatherError {
    /// Wrap a transport failure without the request URL, which carries the API key.
    pub fn transport(endpoint: Endpoint, source: reqwest::Error) -> Self {
        Self::Transport { endpoint, source: source.without_url() }
    }

    pub fn malformed(endpoint: Endpoint, detail: impl Into<String>) -> Self {
        Self::MalformedPayload { endpoint, detail: detail.into() }
    }

    /// The endpoint whose call failed, when the failure came from one.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Self::Status { endpoint, .. }
            | Self::Transport { endpoint, .. }
            | Self::MalformedPayload { endpoint, .. } => Some(*endpoint),
            Self::LocationNotFound { .. } => Some(Endpoint::Geocode),
            Self::MissingApiKey | Self::Config(_) | Self::InvalidInput(_) => None,
        }
    }

    /// One line suitable for showing to the person who triggered the run.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => self.to_string(),
            Self::Config(message) => format!("Configuration error: {message}"),
            Self::InvalidInput(message) => format!("Invalid input: {message}"),
            Self::LocationNotFound { city } => format!("Geocoding failed: no match for '{city}'"),
            Self::Status { endpoint: Endpoint::Geocode, status, .. } => {
                format!("Geocoding failed (HTTP {status})")
            }
            Self::Status { endpoint, status, .. } => {
                format!("Failed to fetch {endpoint} (HTTP {status})")
            }
            Self::Transport { endpoint, source } if source.is_timeout() => {
                format!("{endpoint} request timed out")
            }
            Self::Transport { endpoint, .. } => {
                format!("Could not reach the weather service ({endpoint})")
            }
            Self::MalformedPayload { endpoint, .. } => {
                format!("Unexpected {endpoint} response from the weather service")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, WeatherError>;
