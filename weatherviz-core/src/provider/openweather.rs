use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Request};
use std::time::Duration;

use crate::{
    config::{Config, OPENWEATHER_BASE_URL, UnitSystem},
    model::RawWeatherResponse,
};

use super::{FetchError, WeatherProvider};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: UnitSystem,
    timeout: Duration,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, units: UnitSystem, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            units,
            timeout,
            http: Client::new(),
        }
    }

    /// Fails when no API key is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config
            .require_api_key()
            .context("Cannot create OpenWeather provider")?;

        Ok(Self::new(
            api_key.to_owned(),
            config.units,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    /// Point the provider at another endpoint, e.g. a local test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// `GET <base>?q=<city>&appid=<key>&units=<units>` with the configured timeout.
    pub fn build_request(&self, city_name: &str) -> Result<Request, FetchError> {
        self.http
            .get(&self.base_url)
            .query(&[
                ("q", city_name),
                ("appid", self.api_key.as_str()),
                ("units", self.units.query_value()),
            ])
            .timeout(self.timeout)
            .build()
            .map_err(FetchError::Transport)
    }

    fn transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(err)
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, city_name: &str) -> Result<RawWeatherResponse, FetchError> {
        tracing::info!(city = city_name, units = %self.units, "Fetching weather data");

        let request = self.build_request(city_name)?;
        let res = self
            .http
            .execute(request)
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: RawWeatherResponse = serde_json::from_str(&body)?;
        tracing::debug!(city = city_name, bytes = body.len(), "Received weather payload");

        Ok(parsed)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
