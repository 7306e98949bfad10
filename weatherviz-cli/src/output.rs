use weatherviz_core::{
    ChartRenderer, UnitSystem, WeatherCharts, WeatherRecord, chart::weather_text,
};

pub fn print_weather(record: &WeatherRecord, units: UnitSystem) {
    println!("{}", weather_text(record, units));
}

/// Render charts and report where they went. Failures are printed, never returned.
pub fn render_charts(
    renderer: &ChartRenderer,
    record: &WeatherRecord,
    charts: &WeatherCharts,
    units: UnitSystem,
    simple: bool,
) {
    match renderer.render_overview(record, charts) {
        Ok(path) => println!("Chart saved to {}", path.display()),
        Err(err) => {
            tracing::error!(error = %err, "Chart rendering failed");
            eprintln!("Error generating chart: {err}");
        }
    }

    if simple {
        match renderer.render_simple_temperature(record, units) {
            Ok(path) => println!("Temperature chart saved to {}", path.display()),
            Err(err) => {
                tracing::error!(error = %err, "Temperature chart rendering failed");
                eprintln!("Error generating temperature chart: {err}");
            }
        }
    }
}
