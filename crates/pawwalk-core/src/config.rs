use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_DIR: &str = "pawwalk";
const CONFIG_FILE: &str = "config.toml";
const PLACES_API_KEY_ENV: &str = "PAWWALK_PLACES_API_KEY";
const API_KEY_PLACEHOLDER: &str = "YOUR_GOOGLE_MAPS_API_KEY";

/// A single problem found by `Config::validate`
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors block startup; warnings are only logged
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigIssue>,
    pub warnings: Vec<ConfigIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(issue(field, message));
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(issue(field, message));
    }

    /// All errors on one line, `;` separated
    pub fn error_summary(&self) -> String {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        parts.join("; ")
    }
}

fn issue(field: impl Into<String>, message: impl Into<String>) -> ConfigIssue {
    ConfigIssue {
        field: field.into(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Walk tracking settings
    #[serde(default)]
    pub walk: WalkConfig,

    /// Weather settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Nearby place search settings
    #[serde(default)]
    pub places: PlacesConfig,
}

/// Walk tracker tuning. Defaults match the values the tracker was calibrated with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Walker body weight used for the calorie estimate
    pub weight_kg: f64,
    /// MET value for walking (~5 km/h)
    pub met: f64,
    /// Samples with a larger accuracy radius are dropped
    pub accuracy_threshold_m: f64,
    /// Hops shorter than this are GPS jitter
    pub min_delta_km: f64,
    /// Hops longer than this are implausible jumps
    pub max_delta_km: f64,
    /// Clock tick period for elapsed-time refresh
    pub tick_interval_ms: u64,
    /// Minimum movement before the position source reports again
    pub distance_interval_m: f64,
    /// Minimum time between position reports
    pub time_interval_ms: u64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            weight_kg: 65.0,
            met: 3.5,
            accuracy_threshold_m: 20.0,
            min_delta_km: 0.01,
            max_delta_km: 0.2,
            tick_interval_ms: 1000,
            distance_interval_m: 5.0,
            time_interval_ms: 2000,
        }
    }
}

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Auto,
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Temperature unit preference
    pub temperature_unit: TemperatureUnit,

    /// Refresh interval in minutes
    pub refresh_minutes: u32,

    /// Forecast API base URL
    #[serde(default = "default_weather_api_url")]
    pub api_url: String,

    /// Reverse geocoding base URL
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// Location used when no live position is available
    #[serde(default)]
    pub home_latitude: Option<f64>,
    #[serde(default)]
    pub home_longitude: Option<f64>,
}

fn default_weather_api_url() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::Auto,
            refresh_minutes: 15,
            api_url: default_weather_api_url(),
            geocode_url: default_geocode_url(),
            home_latitude: None,
            home_longitude: None,
        }
    }
}

impl WeatherConfig {
    /// Home coordinates, if both halves are set
    pub fn home(&self) -> Option<(f64, f64)> {
        self.home_latitude.zip(self.home_longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Google Maps Platform API key
    pub api_key: String,

    /// Places API base URL
    #[serde(default = "default_places_api_url")]
    pub api_url: String,

    /// Nearby search radius in meters (default: 10 km)
    #[serde(default = "default_search_radius")]
    pub search_radius_m: u32,

    /// Result language
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_places_api_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_search_radius() -> u32 {
    10_000
}

fn default_language() -> String {
    "ko".to_string()
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: API_KEY_PLACEHOLDER.to_string(),
            api_url: default_places_api_url(),
            search_radius_m: default_search_radius(),
            language: default_language(),
        }
    }
}

impl PlacesConfig {
    /// Check if the API key is set (not a placeholder)
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.api_key.starts_with("YOUR_")
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        Self {
            config_dir,
            walk: WalkConfig::default(),
            weather: WeatherConfig::default(),
            places: PlacesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            config
        };

        // Environment wins over the file so keys need not be written to disk
        if let Ok(key) = std::env::var(PLACES_API_KEY_ENV) {
            if !key.is_empty() {
                config.places.api_key = key;
            }
        }

        Ok(config)
    }

    /// `load` followed by `validate`; fails when validation reports errors
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_walk(&mut result);

        match self.weather.refresh_minutes {
            0 => result.add_warning(
                "weather.refresh_minutes",
                "0 disables the forecast cache; every run fetches",
            ),
            m if m > 24 * 60 => result.add_warning(
                "weather.refresh_minutes",
                "Forecasts older than a day will be shown as current",
            ),
            _ => {}
        }

        validate_url(&self.weather.api_url, "weather.api_url", &mut result);
        validate_url(&self.weather.geocode_url, "weather.geocode_url", &mut result);

        match (self.weather.home_latitude, self.weather.home_longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("weather.home_latitude", "Latitude must be within -90..90");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error(
                        "weather.home_longitude",
                        "Longitude must be within -180..180",
                    );
                }
            }
            (None, None) => {
                result.add_warning(
                    "weather.home",
                    "No home location set - forecast needs a live position",
                );
            }
            _ => {
                result.add_error(
                    "weather.home",
                    "Set both home_latitude and home_longitude, or neither",
                );
            }
        }

        validate_url(&self.places.api_url, "places.api_url", &mut result);
        if self.places.search_radius_m == 0 {
            result.add_error("places.search_radius_m", "Search radius must be greater than 0");
        } else if self.places.search_radius_m > 50_000 {
            result.add_warning("places.search_radius_m", "Places API caps radius at 50000 m");
        }
        if !self.places.is_configured() {
            result.add_warning(
                "places.api_key",
                "Maps API key not configured - nearby search will be unavailable",
            );
        }

        result
    }

    fn validate_walk(&self, result: &mut ValidationResult) {
        let walk = &self.walk;
        // TOML accepts nan and inf, so every float is checked for finiteness
        if !positive(walk.weight_kg) {
            result.add_error("walk.weight_kg", "Weight must be greater than 0");
        }
        if !positive(walk.met) {
            result.add_error("walk.met", "MET must be greater than 0");
        }
        if !positive(walk.accuracy_threshold_m) {
            result.add_error(
                "walk.accuracy_threshold_m",
                "Accuracy threshold must be greater than 0",
            );
        }
        if !walk.min_delta_km.is_finite() || walk.min_delta_km < 0.0 {
            result.add_error("walk.min_delta_km", "Minimum hop cannot be negative");
        }
        if !walk.max_delta_km.is_finite() || walk.min_delta_km >= walk.max_delta_km {
            result.add_error(
                "walk.max_delta_km",
                "Maximum hop must be larger than the minimum hop",
            );
        }
        if walk.tick_interval_ms == 0 {
            result.add_error("walk.tick_interval_ms", "Tick interval must be greater than 0");
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Path of the favorites blob inside the config directory
    pub fn favorites_path(&self) -> PathBuf {
        self.config_dir.join("favorites.json")
    }

    /// Path of the forecast cache inside the config directory
    pub fn weather_cache_path(&self) -> PathBuf {
        self.config_dir.join("weather_cache.json")
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join(APP_DIR);

        Ok(config_dir.join(CONFIG_FILE))
    }
}

/// Endpoint URLs must be absolute http(s) URLs with a host
fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn validate_url(value: &str, field: &str, result: &mut ValidationResult) {
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(e) => return result.add_error(field, format!("not a URL ({})", e)),
    };
    if !matches!(url.scheme(), "http" | "https") {
        result.add_error(field, format!("scheme must be http or https, not {}", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        result.add_error(field, "URL has no host");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_validation() {
        let result = Config::default().validate();
        assert!(result.errors.is_empty(), "{}", result.error_summary());
    }

    #[test]
    fn test_walk_defaults() {
        let walk = WalkConfig::default();
        assert_eq!(walk.weight_kg, 65.0);
        assert_eq!(walk.met, 3.5);
        assert_eq!(walk.accuracy_threshold_m, 20.0);
        assert_eq!(walk.min_delta_km, 0.01);
        assert_eq!(walk.max_delta_km, 0.2);
    }

    #[test]
    fn test_inverted_hop_bounds() {
        let mut config = Config::default();
        config.walk.min_delta_km = 0.5;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "walk.max_delta_km"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.weather.api_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_half_home_location_is_error() {
        let mut config = Config::default();
        config.weather.home_latitude = Some(37.5);
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "weather.home"));
    }

    #[test]
    fn test_places_key_not_configured_is_warning() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "places.api_key"));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.config_dir, dir.path());
        assert_eq!(config.weather.refresh_minutes, 15);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
config_dir = "/tmp/pawwalk"

[walk]
weight_kg = 30.0

[weather]
temperature_unit = "celsius"
refresh_minutes = 30
home_latitude = 37.56
home_longitude = 126.97
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.walk.weight_kg, 30.0);
        assert_eq!(config.walk.met, 3.5);
        assert_eq!(config.weather.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(config.weather.home(), Some((37.56, 126.97)));
        assert_eq!(config.places.search_radius_m, 10_000);
    }

    #[test]
    fn test_error_summary_joins_issues() {
        let mut result = ValidationResult::default();
        result.add_error("walk.met", "must be positive");
        result.add_warning("places.api_key", "not set");
        result.add_error("places.api_url", "URL has no host");
        assert_eq!(
            result.error_summary(),
            "walk.met: must be positive; places.api_url: URL has no host"
        );
    }

    #[test]
    fn test_url_without_scheme_is_error() {
        let mut config = Config::default();
        config.places.api_url = "maps.googleapis.com".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "places.api_url"));
    }

    #[test]
    fn test_nan_walk_values_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
config_dir = "/tmp/pawwalk"

[walk]
weight_kg = nan
met = inf
max_delta_km = nan
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.walk.weight_kg.is_nan());
        let result = config.validate();
        for field in ["walk.weight_kg", "walk.met", "walk.max_delta_km"] {
            assert!(
                result.errors.iter().any(|e| e.field == field),
                "no error for {}",
                field
            );
        }
    }
}
