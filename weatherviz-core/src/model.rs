use serde::{Deserialize, Serialize};

/// Untyped payload as returned by the weather provider.
pub type RawWeatherResponse = serde_json::Value;

/// Fixed-shape weather record. Every field is always populated, falling back
/// to its default when the provider omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city_name: String,
    pub country_code: String,
    pub current_temperature: f64,
    pub feels_like_temperature: f64,
    pub humidity_percentage: i64,
    pub atmospheric_pressure: i64,
    pub wind_speed: f64,
    pub weather_description: String,
    pub weather_main: String,
    pub visibility_meters: i64,
    pub cloudiness_percentage: i64,
}

impl WeatherRecord {
    pub const FIELD_COUNT: usize = 11;

    /// "City, CC", or just the city when no country code is known.
    pub fn display_name(&self) -> String {
        if self.country_code.is_empty() {
            self.city_name.clone()
        } else {
            format!("{}, {}", self.city_name, self.country_code)
        }
    }
}

impl Default for WeatherRecord {
    fn default() -> Self {
        Self {
            city_name: "Unknown".to_string(),
            country_code: String::new(),
            current_temperature: 0.0,
            feels_like_temperature: 0.0,
            humidity_percentage: 0,
            atmospheric_pressure: 0,
            wind_speed: 0.0,
            weather_description: String::new(),
            weather_main: String::new(),
            visibility_meters: 0,
            cloudiness_percentage: 0,
        }
    }
}
