//! One search = one fetch, one normalization. Every failure is turned into a
//! [`SearchOutcome`] so callers never see an error for a bad city or payload.

use chrono::{DateTime, Utc};

use crate::{
    chart::WeatherCharts,
    config::{Config, UnitSystem},
    model::{RawWeatherResponse, WeatherRecord},
    normalize::normalize,
    provider::{FetchError, OpenWeatherProvider, WeatherProvider},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(WeatherRecord),
    /// Blank city name; nothing was requested.
    InvalidCity,
    /// The provider had nothing for this city (transport error, timeout, non-2xx, empty body).
    NoData { reason: String },
    /// The payload arrived but could not be normalized.
    ProcessingFailed { reason: String },
}

impl SearchOutcome {
    pub fn record(&self) -> Option<&WeatherRecord> {
        match self {
            SearchOutcome::Found(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<WeatherRecord> {
        match self {
            SearchOutcome::Found(record) => Some(record),
            _ => None,
        }
    }

    /// Message to show the user, or `None` on success.
    pub fn user_message(&self, city_name: &str) -> Option<String> {
        match self {
            SearchOutcome::Found(_) => None,
            SearchOutcome::InvalidCity => Some("Please enter a city name".to_string()),
            SearchOutcome::NoData { .. } => Some(format!(
                "Could not find weather data for '{}'. Please check the city name.",
                city_name.trim()
            )),
            SearchOutcome::ProcessingFailed { .. } => Some(format!(
                "Weather data for '{}' could not be processed.",
                city_name.trim()
            )),
        }
    }
}

#[derive(Debug)]
pub struct WeatherService<P> {
    provider: P,
    units: UnitSystem,
}

impl WeatherService<OpenWeatherProvider> {
    /// Fails when no API key is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = OpenWeatherProvider::from_config(config)?;
        tracing::info!(units = %config.units, "Weather service initialized");
        Ok(Self::new(provider, config.units))
    }
}

impl<P: WeatherProvider> WeatherService<P> {
    pub fn new(provider: P, units: UnitSystem) -> Self {
        Self { provider, units }
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Raw payload for `city_name`. Any `Err` is the "no data" signal; an
    /// empty payload counts as one too.
    pub async fn fetch_raw(&self, city_name: &str) -> Result<RawWeatherResponse, FetchError> {
        let result = match self.provider.fetch(city_name).await {
            Ok(raw) if is_empty_payload(&raw) => Err(FetchError::EmptyPayload),
            other => other,
        };

        if let Err(err) = &result {
            tracing::error!(city = city_name, error = %err, "Error fetching weather data");
        }
        result
    }

    pub async fn search(&self, city_name: &str) -> SearchOutcome {
        let city_name = city_name.trim();
        if city_name.is_empty() {
            return SearchOutcome::InvalidCity;
        }

        let raw = match self.fetch_raw(city_name).await {
            Ok(raw) => raw,
            Err(err) => {
                return SearchOutcome::NoData {
                    reason: err.to_string(),
                };
            }
        };

        match normalize(&raw) {
            Ok(record) => SearchOutcome::Found(record),
            Err(err) => SearchOutcome::ProcessingFailed {
                reason: err.to_string(),
            },
        }
    }

    pub fn charts_for(&self, record: &WeatherRecord) -> WeatherCharts {
        WeatherCharts::from_record(record, self.units)
    }
}

fn is_empty_payload(raw: &RawWeatherResponse) -> bool {
    match raw {
        RawWeatherResponse::Null => true,
        RawWeatherResponse::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// The most recent successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestWeather {
    pub record: WeatherRecord,
    pub charts: WeatherCharts,
    pub fetched_at: DateTime<Utc>,
}

/// Session state for an interactive front end. Each successful search
/// replaces the previous one.
#[derive(Debug, Default)]
pub struct Dashboard {
    latest: Option<LatestWeather>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&LatestWeather> {
        self.latest.as_ref()
    }

    pub fn update(&mut self, record: WeatherRecord, charts: WeatherCharts) -> &LatestWeather {
        self.latest.insert(LatestWeather {
            record,
            charts,
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    #[derive(Debug)]
    enum Reply {
        Payload(Value),
        NotFound,
        Timeout,
    }

    #[derive(Debug)]
    struct StubProvider {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn fetch(&self, _city_name: &str) -> Result<RawWeatherResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Payload(value) => Ok(value.clone()),
                Reply::NotFound => Err(FetchError::Status {
                    status: reqwest::StatusCode::NOT_FOUND,
                    body: "{\"cod\":\"404\",\"message\":\"city not found\"}".into(),
                }),
                Reply::Timeout => Err(FetchError::Timeout(Duration::from_secs(10))),
            }
        }
    }

    fn service(reply: Reply) -> WeatherService<StubProvider> {
        WeatherService::new(StubProvider::new(reply), UnitSystem::Metric)
    }

    fn london() -> Value {
        json!({
            "name": "London",
            "sys": { "country": "GB" },
            "main": { "temp": 15.678, "feels_like": 14.2, "humidity": 80, "pressure": 1013 },
            "wind": { "speed": 3.5 },
            "weather": [{ "description": "light rain", "main": "Rain" }],
            "visibility": 10000,
            "clouds": { "all": 75 }
        })
    }

    #[tokio::test]
    async fn found_city_is_normalized() {
        let outcome = service(Reply::Payload(london())).search("London").await;

        let record = outcome.record().expect("record");
        assert_eq!(record.city_name, "London");
        assert_eq!(record.current_temperature, 15.7);
        assert_eq!(outcome.user_message("London"), None);
    }

    #[tokio::test]
    async fn timeout_is_no_data_not_a_crash() {
        let outcome = service(Reply::Timeout).search("London").await;

        match &outcome {
            SearchOutcome::NoData { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected NoData, got {other:?}"),
        }
        assert!(outcome.record().is_none());
    }

    #[tokio::test]
    async fn unknown_city_gives_user_message() {
        let outcome = service(Reply::NotFound).search("Atlantis").await;

        assert!(matches!(outcome, SearchOutcome::NoData { .. }));
        assert_eq!(
            outcome.user_message("Atlantis").as_deref(),
            Some("Could not find weather data for 'Atlantis'. Please check the city name.")
        );
    }

    #[tokio::test]
    async fn blank_city_is_rejected_without_fetching() {
        let svc = service(Reply::Payload(london()));
        let outcome = svc.search("   ").await;

        assert_eq!(outcome, SearchOutcome::InvalidCity);
        assert_eq!(svc.provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.user_message("").as_deref(), Some("Please enter a city name"));
    }

    #[tokio::test]
    async fn malformed_payload_is_processing_failure() {
        let outcome = service(Reply::Payload(json!({ "main": { "temp": "hot" } })))
            .search("Cairo")
            .await;

        match outcome {
            SearchOutcome::ProcessingFailed { reason } => assert!(reason.contains("main.temp")),
            other => panic!("expected ProcessingFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_payload_is_no_data() {
        let outcome = service(Reply::Payload(json!({}))).search("Nowhere").await;

        match outcome {
            SearchOutcome::NoData { reason } => assert!(reason.contains("empty payload")),
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_raw_keeps_the_error_type() {
        let err = service(Reply::Timeout).fetch_raw("London").await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(d) if d == Duration::from_secs(10)));

        let err = service(Reply::NotFound).fetch_raw("Atlantis").await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Status { status, .. } if status == reqwest::StatusCode::NOT_FOUND
        ));

        let err = service(Reply::Payload(json!(null))).fetch_raw("Nowhere").await.unwrap_err();
        assert!(matches!(err, FetchError::EmptyPayload));

        let raw = service(Reply::Payload(london())).fetch_raw("London").await.unwrap();
        assert_eq!(raw["name"], "London");
    }

    #[tokio::test]
    async fn sparse_payload_is_defaulted() {
        let outcome = service(Reply::Payload(json!({ "name": "Reykjavik" })))
            .search("Reykjavik")
            .await;

        let record = outcome.into_record().expect("record");
        assert_eq!(record.city_name, "Reykjavik");
        assert_eq!(record.weather_main, "");
        assert_eq!(record.visibility_meters, 0);
    }

    #[tokio::test]
    async fn boxed_provider_can_be_injected() {
        let provider: Box<dyn WeatherProvider> =
            Box::new(StubProvider::new(Reply::Payload(london())));
        let svc = WeatherService::new(provider, UnitSystem::Kelvin);

        let record = svc.search("London").await.into_record().unwrap();
        let charts = svc.charts_for(&record);
        assert_eq!(charts.temperature_unit, "K");
    }

    #[test]
    fn dashboard_keeps_only_latest_result() {
        let mut dashboard = Dashboard::new();
        assert!(dashboard.latest().is_none());

        let first = WeatherRecord {
            city_name: "Paris".into(),
            ..WeatherRecord::default()
        };
        let second = WeatherRecord {
            city_name: "Tokyo".into(),
            ..WeatherRecord::default()
        };

        let charts = WeatherCharts::from_record(&first, UnitSystem::Metric);
        dashboard.update(first, charts);
        let charts = WeatherCharts::from_record(&second, UnitSystem::Metric);
        let latest = dashboard.update(second, charts);

        assert_eq!(latest.record.city_name, "Tokyo");
        assert_eq!(dashboard.latest().unwrap().record.city_name, "Tokyo");
    }
}
