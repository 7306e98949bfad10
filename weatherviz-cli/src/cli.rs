use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use std::path::PathBuf;
use weatherviz_core::{
    ChartRenderer, Config, Dashboard, OpenWeatherProvider, UnitSystem, WeatherService,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherviz", version, about = "Weather data visualization dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and preferred units.
    Configure,

    /// Show current weather for a city and render its charts.
    Show {
        /// City name, e.g. "London" or "New York".
        city: String,

        /// Print the normalized record as JSON instead of text.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Prompt for cities until an empty line is entered.
    Interactive {
        #[command(flatten)]
        display: DisplayArgs,
    },
}

/// Overrides shared by every search command.
#[derive(Debug, Clone, Args)]
pub struct DisplayArgs {
    /// Unit system: metric, imperial or kelvin.
    #[arg(long)]
    pub units: Option<UnitSystem>,

    /// Directory for chart images.
    #[arg(long)]
    pub charts_dir: Option<PathBuf>,

    /// Skip chart rendering.
    #[arg(long)]
    pub no_chart: bool,

    /// Also render the stand-alone temperature chart.
    #[arg(long)]
    pub simple: bool,
}

impl DisplayArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(units) = self.units {
            config.units = units;
        }
        if let Some(dir) = &self.charts_dir {
            config.charts_dir = dir.clone();
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, json, display } => {
                let (service, renderer) = setup(&display)?;
                show(&service, &renderer, &display, &city, json).await
            }
            Command::Interactive { display } => {
                let (service, renderer) = setup(&display)?;
                interactive(&service, &renderer, &display).await
            }
        }
    }
}

/// Load config and build the service. A missing API key stops here, before any search.
fn setup(
    display: &DisplayArgs,
) -> anyhow::Result<(WeatherService<OpenWeatherProvider>, ChartRenderer)> {
    let mut config = Config::load()?;
    config.apply_env()?;
    display.apply(&mut config);

    let service = WeatherService::from_config(&config)?;
    let renderer = ChartRenderer::from_config(&config);

    Ok((service, renderer))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;

    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let cursor = UnitSystem::all()
        .iter()
        .position(|u| *u == config.units)
        .unwrap_or(0);
    config.units = Select::new("Units:", UnitSystem::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read unit system")?;

    config.require_api_key()?;
    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

async fn show(
    service: &WeatherService<OpenWeatherProvider>,
    renderer: &ChartRenderer,
    display: &DisplayArgs,
    city: &str,
    json: bool,
) -> anyhow::Result<()> {
    let outcome = service.search(city).await;

    if let Some(message) = outcome.user_message(city) {
        eprintln!("{message}");
        return Ok(());
    }

    if let Some(record) = outcome.record() {
        if json {
            let rendered = serde_json::to_string_pretty(record)
                .context("Failed to serialize weather record")?;
            println!("{rendered}");
        } else {
            output::print_weather(record, service.units());
        }

        if !display.no_chart {
            let charts = service.charts_for(record);
            output::render_charts(renderer, record, &charts, service.units(), display.simple);
        }
    }

    Ok(())
}

async fn interactive(
    service: &WeatherService<OpenWeatherProvider>,
    renderer: &ChartRenderer,
    display: &DisplayArgs,
) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new();
    println!("Weather Data Visualization Dashboard");

    loop {
        let city = match Text::new("Enter City Name:")
            .with_help_message("e.g., London, Tokyo, New York (empty to quit)")
            .prompt()
        {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read city name"),
        };

        if city.trim().is_empty() {
            break;
        }

        let outcome = service.search(&city).await;
        if let Some(message) = outcome.user_message(&city) {
            eprintln!("{message}");
            continue;
        }

        if let Some(record) = outcome.into_record() {
            let charts = service.charts_for(&record);
            let latest = dashboard.update(record, charts);

            println!();
            output::print_weather(&latest.record, service.units());
            println!("Updated {}", latest.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));

            if !display.no_chart {
                output::render_charts(
                    renderer,
                    &latest.record,
                    &latest.charts,
                    service.units(),
                    display.simple,
                );
            }
            println!();
        }
    }

    Ok(())
}
