use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::RawWeatherResponse;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Why a fetch produced no payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to OpenWeather timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("failed to send request to OpenWeather: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("OpenWeather request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse OpenWeather JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("OpenWeather returned an empty payload")]
    EmptyPayload,
}

/// Source of raw current-weather payloads for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, city_name: &str) -> Result<RawWeatherResponse, FetchError>;
}

#[async_trait]
impl<P: WeatherProvider + ?Sized> WeatherProvider for Box<P> {
    async fn fetch(&self, city_name: &str) -> Result<RawWeatherResponse, FetchError> {
        (**self).fetch(city_name).await
    }
}
