use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Current-weather endpoint of the OpenWeatherMap API.
pub const OPENWEATHER_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const UNITS_ENV: &str = "WEATHERVIZ_UNITS";

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
    Kelvin,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
            UnitSystem::Kelvin => "kelvin",
        }
    }

    /// Value of the `units` query parameter. OpenWeather calls Kelvin "standard".
    pub fn query_value(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
            UnitSystem::Kelvin => "standard",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
            UnitSystem::Kelvin => "K",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial, UnitSystem::Kelvin]
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            "kelvin" => Ok(UnitSystem::Kelvin),
            _ => Err(anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial, kelvin."
            )),
        }
    }
}

fn default_charts_dir() -> PathBuf {
    PathBuf::from("assets/charts")
}

fn default_chart_filename() -> String {
    "current_weather_chart.png".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// charts_dir = "assets/charts"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub units: UnitSystem,

    #[serde(default = "default_charts_dir")]
    pub charts_dir: PathBuf,

    #[serde(default = "default_chart_filename")]
    pub chart_filename: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: UnitSystem::default(),
            charts_dir: default_charts_dir(),
            chart_filename: default_chart_filename(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherviz", "weatherviz")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay `OPENWEATHER_API_KEY` and `WEATHERVIZ_UNITS` from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(env::var(API_KEY_ENV).ok(), env::var(UNITS_ENV).ok())
            .with_context(|| format!("Invalid value in {UNITS_ENV}"))
    }

    /// Blank values are ignored so an empty `.env` entry doesn't clear a stored key.
    pub fn apply_overrides(&mut self, api_key: Option<String>, units: Option<String>) -> Result<()> {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }

        if let Some(units) = units.filter(|u| !u.trim().is_empty()) {
            self.units = units.parse()?;
        }

        Ok(())
    }

    /// The API key, or the fatal configuration error when none is set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "OpenWeatherMap API key is not configured.\n\
                     Hint: run `weatherviz configure` or set {API_KEY_ENV} in your environment or .env file."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn chart_path(&self) -> PathBuf {
        self.charts_dir.join(&self.chart_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("API key is not configured"));
        assert!(msg.contains("OPENWEATHER_API_KEY"));
    }

    #[test]
    fn empty_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key(String::new());

        assert!(cfg.require_api_key().is_err());
    }

    #[test]
    fn defaults_match_dashboard_settings() {
        let cfg = Config::default();

        assert_eq!(cfg.units, UnitSystem::Metric);
        assert_eq!(cfg.timeout_secs, 10);
        assert_eq!(
            cfg.chart_path(),
            PathBuf::from("assets/charts/current_weather_chart.png")
        );
    }

    #[test]
    fn overrides_set_key_and_units() {
        let mut cfg = Config::default();
        cfg.apply_overrides(Some(" KEY ".into()), Some("Imperial".into()))
            .expect("valid overrides");

        assert_eq!(cfg.require_api_key().unwrap(), "KEY");
        assert_eq!(cfg.units, UnitSystem::Imperial);
    }

    #[test]
    fn blank_overrides_keep_stored_values() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());
        cfg.units = UnitSystem::Kelvin;

        cfg.apply_overrides(Some("  ".into()), Some(String::new())).unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("STORED"));
        assert_eq!(cfg.units, UnitSystem::Kelvin);
    }

    #[test]
    fn unknown_units_override_is_rejected() {
        let mut cfg = Config::default();
        let err = cfg.apply_overrides(None, Some("rankine".into())).unwrap_err();

        assert!(err.to_string().contains("Unknown unit system"));
    }

    #[test]
    fn unit_system_parses_every_name() {
        for units in UnitSystem::all() {
            let parsed: UnitSystem = units.as_str().parse().expect("known name");
            assert_eq!(*units, parsed);
        }
        assert_eq!(UnitSystem::Kelvin.query_value(), "standard");
    }

    #[test]
    fn load_from_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("abc123".into());
        cfg.units = UnitSystem::Imperial;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"k\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("k"));
        assert_eq!(cfg.chart_filename, "current_weather_chart.png");
        assert_eq!(cfg.timeout_secs, 10);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "units = 42\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
