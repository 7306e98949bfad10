//! Core library for the `weatherviz` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider behind a [`WeatherProvider`] trait
//! - Normalization of raw payloads into [`WeatherRecord`]s
//! - Chart data derived from a record, and its PNG rendering
//! - The search service tying those together
//!
//! It is used by `weatherviz-cli`, but can also be reused by other front ends.

pub mod chart;
pub mod config;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod render;
pub mod service;

pub use chart::{ChartSeries, WeatherCharts};
pub use config::{Config, UnitSystem};
pub use model::{RawWeatherResponse, WeatherRecord};
pub use normalize::{NormalizeError, normalize};
pub use provider::{FetchError, OpenWeatherProvider, WeatherProvider};
pub use render::{ChartRenderer, RenderError};
pub use service::{Dashboard, LatestWeather, SearchOutcome, WeatherService};
