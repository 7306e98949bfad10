//! PNG rendering of [`WeatherCharts`] with `plotters`.

use plotters::coord::Shift;
use plotters::prelude::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    chart::{ChartSeries, WeatherCharts, format_number, simple_temperature_series},
    config::{Config, UnitSystem},
    model::WeatherRecord,
};

const OVERVIEW_SIZE: (u32, u32) = (1800, 1500);
const SIMPLE_SIZE: (u32, u32) = (1200, 900);
const SUMMARY_BACKGROUND: RGBColor = RGBColor(0xad, 0xd8, 0xe6);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create charts directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to draw chart {}: {message}", .path.display())]
    Draw { path: PathBuf, message: String },
}

type DrawResult = Result<(), String>;

fn draw_err<E: std::fmt::Display>(err: E) -> String {
    err.to_string()
}

/// Writes chart images into a fixed directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    charts_dir: PathBuf,
    chart_filename: String,
}

impl ChartRenderer {
    pub fn new(charts_dir: impl Into<PathBuf>, chart_filename: impl Into<String>) -> Self {
        Self {
            charts_dir: charts_dir.into(),
            chart_filename: chart_filename.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.charts_dir.clone(), config.chart_filename.clone())
    }

    pub fn overview_path(&self) -> PathBuf {
        self.charts_dir.join(&self.chart_filename)
    }

    pub fn simple_path(&self) -> PathBuf {
        self.charts_dir.join(format!("simple_{}", self.chart_filename))
    }

    pub fn ensure_dir(&self) -> Result<(), RenderError> {
        fs::create_dir_all(&self.charts_dir).map_err(|source| RenderError::CreateDir {
            path: self.charts_dir.clone(),
            source,
        })
    }

    /// 2x2 dashboard: temperature, atmospheric, wind/visibility and the summary text.
    pub fn render_overview(
        &self,
        record: &WeatherRecord,
        charts: &WeatherCharts,
    ) -> Result<PathBuf, RenderError> {
        self.ensure_dir()?;
        let path = self.overview_path();

        draw_overview(&path, record, charts).map_err(|message| RenderError::Draw {
            path: path.clone(),
            message,
        })?;

        tracing::info!(path = %path.display(), "Weather overview chart written");
        Ok(path)
    }

    pub fn render_simple_temperature(
        &self,
        record: &WeatherRecord,
        units: UnitSystem,
    ) -> Result<PathBuf, RenderError> {
        self.ensure_dir()?;
        let path = self.simple_path();
        let series = simple_temperature_series(record);

        draw_simple(&path, &series, units.temperature_symbol()).map_err(|message| {
            RenderError::Draw {
                path: path.clone(),
                message,
            }
        })?;

        tracing::info!(path = %path.display(), "Simple temperature chart written");
        Ok(path)
    }
}

fn draw_overview(path: &Path, record: &WeatherRecord, charts: &WeatherCharts) -> DrawResult {
    let root = BitMapBackend::new(path, OVERVIEW_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let caption = format!("Weather Dashboard - {}, {}", record.city_name, record.country_code);
    let root = root
        .titled(&caption, ("sans-serif", 48).into_font().style(FontStyle::Bold))
        .map_err(draw_err)?;

    let panels = root.split_evenly((2, 2));

    draw_bars(&panels[0], &charts.temperature, charts.temperature_unit)?;
    draw_bars(&panels[1], &charts.atmospheric, "")?;
    draw_bars(&panels[2], &charts.wind_visibility, "")?;
    draw_summary(&panels[3], &charts.summary)?;

    root.present().map_err(draw_err)
}

fn draw_simple(path: &Path, series: &ChartSeries, unit: &str) -> DrawResult {
    let root = BitMapBackend::new(path, SIMPLE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    draw_bars(&root, series, unit)?;

    root.present().map_err(draw_err)
}

fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    series: &ChartSeries,
    value_suffix: &str,
) -> DrawResult {
    let count = series.len();
    let (low, high) = value_range(&series.values);

    let mut chart = ChartBuilder::on(area)
        .caption(&series.title, ("sans-serif", 32).into_font().style(FontStyle::Bold))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d((0..count).into_segmented(), low..high)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count)
        .x_label_formatter(&|x: &SegmentValue<usize>| match x {
            SegmentValue::CenterOf(i) => {
                series.labels.get(*i).map(|l| l.to_string()).unwrap_or_default()
            }
            _ => String::new(),
        })
        .label_style(("sans-serif", 20))
        .light_line_style(BLACK.mix(0.1))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(series.bars().enumerate().map(|(i, (_, value, color))| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), value)],
                hex_color(color).filled(),
            );
            bar.set_margin(0, 0, 30, 30);
            bar
        }))
        .map_err(draw_err)?;

    let offset = (high - low) * 0.02;
    chart
        .draw_series(series.bars().enumerate().map(|(i, (_, value, _))| {
            Text::new(
                format!("{}{value_suffix}", format_number(value)),
                (SegmentValue::CenterOf(i), value + offset),
                ("sans-serif", 22).into_font().style(FontStyle::Bold),
            )
        }))
        .map_err(draw_err)?;

    Ok(())
}

fn draw_summary<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, summary: &str) -> DrawResult {
    let boxed = area.margin(40, 40, 40, 40);
    boxed.fill(&SUMMARY_BACKGROUND.mix(0.8)).map_err(draw_err)?;

    let style = ("sans-serif", 26).into_font();
    for (row, line) in summary.lines().enumerate() {
        let y = 30 + row as i32 * 38;
        boxed
            .draw(&Text::new(line.to_string(), (30, y), style.clone()))
            .map_err(draw_err)?;
    }

    Ok(())
}

/// Y range that always includes zero, padded so value labels fit.
fn value_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(0.0_f64, f64::min);
    let max = values.iter().copied().fold(0.0_f64, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 1.0);
    }

    let padding = (max - min) * 0.15;
    let low = if min < 0.0 { min - padding } else { 0.0 };
    (low, max + padding)
}

/// `#rrggbb` to an RGB colour; anything unparsable draws black.
fn hex_color(hex: &str) -> RGBColor {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
    };

    match (digits.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => RGBColor(r, g, b),
        _ => BLACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_in_charts_dir() {
        let renderer = ChartRenderer::new("out/charts", "weather.png");

        assert_eq!(renderer.overview_path(), PathBuf::from("out/charts/weather.png"));
        assert_eq!(renderer.simple_path(), PathBuf::from("out/charts/simple_weather.png"));
    }

    #[test]
    fn from_config_uses_configured_location() {
        let cfg = Config::default();
        let renderer = ChartRenderer::from_config(&cfg);

        assert_eq!(renderer.overview_path(), cfg.chart_path());
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("assets").join("charts");
        let renderer = ChartRenderer::new(&dir, "chart.png");

        renderer.ensure_dir().unwrap();
        assert!(dir.is_dir());

        // Second call is a no-op.
        renderer.ensure_dir().unwrap();
    }

    #[test]
    fn ensure_dir_reports_blocked_path() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let renderer = ChartRenderer::new(blocker.join("charts"), "chart.png");
        let err = renderer.ensure_dir().unwrap_err();

        assert!(matches!(err, RenderError::CreateDir { .. }));
        assert!(err.to_string().contains("failed to create charts directory"));
    }

    #[test]
    fn value_range_includes_zero() {
        assert_eq!(value_range(&[0.0, 0.0]), (0.0, 1.0));

        let (low, high) = value_range(&[80.0, 101.3, 75.0]);
        assert_eq!(low, 0.0);
        assert!(high > 101.3);

        let (low, high) = value_range(&[-5.0, -2.0]);
        assert!(low < -5.0);
        assert!(high > 0.0);
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(hex_color("#ff6b6b"), RGBColor(0xff, 0x6b, 0x6b));
        assert_eq!(hex_color("023e8a"), RGBColor(0x02, 0x3e, 0x8a));
        assert_eq!(hex_color("#zzz"), BLACK);
    }
}
