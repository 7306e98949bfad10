//! Flattening of raw provider payloads into [`WeatherRecord`]s.
//!
//! Missing or mistyped leaves fall back to the record defaults: absent keys,
//! `null`s, missing intermediate objects and values of the wrong type. Only a
//! payload whose structure cannot be walked (`"main": 5`, `"weather": "rain"`)
//! or a temperature that cannot be rounded makes normalization fail.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{RawWeatherResponse, WeatherRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("raw weather response is not a JSON object")]
    NotAnObject,

    #[error("field `{path}` has an unexpected type (expected {expected})")]
    InvalidField { path: String, expected: &'static str },
}

impl NormalizeError {
    fn invalid(path: &[&str], expected: &'static str) -> Self {
        NormalizeError::InvalidField { path: path.join("."), expected }
    }
}

type Result<T> = std::result::Result<T, NormalizeError>;

/// Normalize a raw OpenWeather "current weather" payload.
///
/// `Ok` always carries all eleven fields. `Err` means the payload had a shape
/// we cannot interpret and no record should be shown for it.
pub fn normalize(raw: &RawWeatherResponse) -> Result<WeatherRecord> {
    match extract(raw) {
        Ok(record) => {
            tracing::info!(city = %record.city_name, "Successfully processed weather data");
            Ok(record)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Error processing weather data");
            Err(err)
        }
    }
}

fn extract(raw: &RawWeatherResponse) -> Result<WeatherRecord> {
    let root = raw.as_object().ok_or(NormalizeError::NotAnObject)?;
    let defaults = WeatherRecord::default();

    let (weather_description, weather_main) = match first_condition(root)? {
        Some(condition) => (
            text(condition.get("description"), ""),
            text(condition.get("main"), ""),
        ),
        None => (String::new(), String::new()),
    };

    Ok(WeatherRecord {
        city_name: text(lookup(root, &["name"])?, &defaults.city_name),
        country_code: text(lookup(root, &["sys", "country"])?, ""),
        current_temperature: temperature(root, &["main", "temp"])?,
        feels_like_temperature: temperature(root, &["main", "feels_like"])?,
        humidity_percentage: integer(lookup(root, &["main", "humidity"])?),
        atmospheric_pressure: integer(lookup(root, &["main", "pressure"])?),
        wind_speed: number(lookup(root, &["wind", "speed"])?).unwrap_or(0.0),
        weather_description,
        weather_main,
        visibility_meters: integer(lookup(root, &["visibility"])?),
        cloudiness_percentage: integer(lookup(root, &["clouds", "all"])?),
    })
}

/// Walk `path` through nested objects. Absent or `null` at any level is `None`.
fn lookup<'a>(root: &'a Map<String, Value>, path: &[&str]) -> Result<Option<&'a Value>> {
    let mut current = root;
    let (last, parents) = match path.split_last() {
        Some(split) => split,
        None => return Ok(None),
    };

    for (depth, key) in parents.iter().enumerate() {
        match current.get(*key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(inner)) => current = inner,
            Some(_) => return Err(NormalizeError::invalid(&path[..=depth], "object")),
        }
    }

    Ok(current.get(*last).filter(|v| !v.is_null()))
}

/// First entry of the `weather` conditions array, if there is one.
fn first_condition(root: &Map<String, Value>) -> Result<Option<&Map<String, Value>>> {
    match root.get("weather") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => match items.first() {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(condition)) => Ok(Some(condition)),
            Some(_) => Err(NormalizeError::invalid(&["weather", "0"], "object")),
        },
        Some(_) => Err(NormalizeError::invalid(&["weather"], "array")),
    }
}

/// Temperatures must be numeric when present: they are rounded.
fn temperature(root: &Map<String, Value>, path: &[&str]) -> Result<f64> {
    match lookup(root, path)? {
        None => Ok(0.0),
        Some(v) => number(Some(v))
            .map(round1)
            .ok_or_else(|| NormalizeError::invalid(path, "number")),
    }
}

fn text(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => default.to_string(),
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

/// Any JSON number, truncated toward zero; anything else is 0.
fn integer(value: Option<&Value>) -> i64 {
    match value {
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        None => 0,
    }
}

/// Round to one decimal place the way a decimal printout would: the exact
/// stored value decides, and exact ties go to the even digit.
pub(crate) fn round1(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}
