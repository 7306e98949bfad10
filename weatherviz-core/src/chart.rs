//! Chart data derived from a [`WeatherRecord`].
//!
//! Everything here is a pure function of the record and the unit system;
//! drawing lives in [`crate::render`].

use serde::Serialize;

use crate::{config::UnitSystem, model::WeatherRecord};

/// One bar chart: parallel label, value and colour lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub labels: Vec<&'static str>,
    pub values: Vec<f64>,
    /// `#rrggbb`
    pub colors: Vec<&'static str>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(label, value, colour)` per bar.
    pub fn bars(&self) -> impl Iterator<Item = (&'static str, f64, &'static str)> + '_ {
        self.labels
            .iter()
            .zip(&self.values)
            .zip(&self.colors)
            .map(|((label, value), color)| (*label, *value, *color))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherCharts {
    pub temperature: ChartSeries,
    pub atmospheric: ChartSeries,
    pub wind_visibility: ChartSeries,
    pub summary: String,
    /// Suffix for temperature value labels, e.g. `°C`.
    pub temperature_unit: &'static str,
}

impl WeatherCharts {
    pub fn from_record(record: &WeatherRecord, units: UnitSystem) -> Self {
        Self {
            temperature: temperature_series(record, units),
            atmospheric: atmospheric_series(record),
            wind_visibility: wind_visibility_series(record),
            summary: summary_text(record, units),
            temperature_unit: units.temperature_symbol(),
        }
    }
}

pub fn temperature_series(record: &WeatherRecord, units: UnitSystem) -> ChartSeries {
    ChartSeries {
        title: format!("Temperature ({})", units.temperature_symbol()),
        labels: vec!["Current Temp", "Feels Like"],
        values: vec![record.current_temperature, record.feels_like_temperature],
        colors: vec!["#ff6b6b", "#feca57"],
    }
}

/// Pressure is shown as hPa / 10 so it sits on the same 0-100 scale as
/// humidity and cloudiness. The "kPa" label is kept as displayed historically.
pub fn atmospheric_series(record: &WeatherRecord) -> ChartSeries {
    ChartSeries {
        title: "Atmospheric Conditions".to_string(),
        labels: vec!["Humidity (%)", "Pressure (kPa)", "Cloudiness (%)"],
        values: vec![
            record.humidity_percentage as f64,
            record.atmospheric_pressure as f64 / 10.0,
            record.cloudiness_percentage as f64,
        ],
        colors: vec!["#48cae4", "#023e8a", "#6c757d"],
    }
}

pub fn wind_visibility_series(record: &WeatherRecord) -> ChartSeries {
    ChartSeries {
        title: "Wind & Visibility".to_string(),
        labels: vec!["Wind Speed (m/s)", "Visibility (km)"],
        values: vec![record.wind_speed, record.visibility_meters as f64 / 1000.0],
        colors: vec!["#90e0ef", "#0077b6"],
    }
}

/// Stand-alone temperature comparison chart.
pub fn simple_temperature_series(record: &WeatherRecord) -> ChartSeries {
    ChartSeries {
        title: format!("Temperature in {}", record.city_name),
        labels: vec!["Actual Temperature", "Feels Like Temperature"],
        values: vec![record.current_temperature, record.feels_like_temperature],
        colors: vec!["#ff6b6b", "#feca57"],
    }
}

pub fn summary_text(record: &WeatherRecord, units: UnitSystem) -> String {
    let sym = units.temperature_symbol();
    format!(
        "Weather Summary\n\
         \n\
         Condition: {}\n\
         Description: {}\n\
         \n\
         Temperature: {}{sym}\n\
         Feels Like: {}{sym}\n\
         Humidity: {}%\n\
         Pressure: {} hPa\n\
         Wind Speed: {} m/s",
        record.weather_main,
        title_case(&record.weather_description),
        format_number(record.current_temperature),
        format_number(record.feels_like_temperature),
        record.humidity_percentage,
        record.atmospheric_pressure,
        format_number(record.wind_speed),
    )
}

/// The text panel shown next to the charts.
pub fn weather_text(record: &WeatherRecord, units: UnitSystem) -> String {
    let sym = units.temperature_symbol();
    format!(
        "{}\n\
         Temperature: {}{sym} (feels like {}{sym})\n\
         Humidity: {}%\n\
         Pressure: {} hPa\n\
         Wind Speed: {} m/s\n\
         Conditions: {}",
        record.display_name(),
        format_number(record.current_temperature),
        format_number(record.feels_like_temperature),
        record.humidity_percentage,
        record.atmospheric_pressure,
        format_number(record.wind_speed),
        title_case(&record.weather_description),
    )
}

/// Upper-case the first letter of every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Shortest representation, but whole numbers keep one decimal (`15.0`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
