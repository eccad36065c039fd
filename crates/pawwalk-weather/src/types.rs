use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit forecasts are requested and displayed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Auto,
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Concrete unit used for requests. `Auto` resolves to Celsius.
    pub fn resolved(self) -> Self {
        match self {
            Self::Fahrenheit => Self::Fahrenheit,
            Self::Auto | Self::Celsius => Self::Celsius,
        }
    }

    pub fn to_celsius(self, value: f64) -> f64 {
        match self.resolved() {
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            _ => value,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self.resolved() {
            Self::Fahrenheit => "°F",
            _ => "°C",
        }
    }
}

impl From<pawwalk_core::TemperatureUnit> for TemperatureUnit {
    fn from(unit: pawwalk_core::TemperatureUnit) -> Self {
        match unit {
            pawwalk_core::TemperatureUnit::Auto => Self::Auto,
            pawwalk_core::TemperatureUnit::Celsius => Self::Celsius,
            pawwalk_core::TemperatureUnit::Fahrenheit => Self::Fahrenheit,
        }
    }
}

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Map a WMO weather interpretation code (Open-Meteo `weather_code`)
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 | 2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            // Freezing drizzle and freezing rain
            56 | 57 | 66 | 67 => Self::Sleet,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }
}

/// Geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub city_name: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
            city_name: None,
        }
    }

    /// City name if known, otherwise rounded coordinates
    pub fn label(&self) -> String {
        match &self.city_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{:.3}, {:.3}", self.latitude, self.longitude),
        }
    }
}

/// Conditions at fetch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: WeatherCondition,
    pub updated_at: DateTime<Utc>,
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub condition: WeatherCondition,
    pub precipitation_chance: u8,
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
}

impl DayForecast {
    /// Representative daytime temperature
    pub fn mean_temperature(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// One fetch worth of data: now, the coming days and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub current: CurrentWeather,
    pub forecast: Vec<DayForecast>,
    pub location: Location,
    pub unit: TemperatureUnit,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("forecast request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("forecast API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unreadable forecast: {0}")]
    Parse(String),
    #[error("forecast cache: {0}")]
    Cache(String),
}

impl From<WeatherError> for pawwalk_core::AppError {
    fn from(e: WeatherError) -> Self {
        let mapped = match e {
            WeatherError::Network(_) => pawwalk_core::WeatherError::ServiceUnavailable,
            WeatherError::Api { status, .. } if status >= 500 => {
                pawwalk_core::WeatherError::ServiceUnavailable
            }
            WeatherError::Api { status, message } => {
                pawwalk_core::WeatherError::ApiError(format!("{}: {}", status, message))
            }
            WeatherError::Parse(msg) => pawwalk_core::WeatherError::ApiError(msg),
            WeatherError::Cache(msg) => pawwalk_core::WeatherError::CacheError(msg),
        };
        mapped.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_code_table() {
        let cases = [
            (0, WeatherCondition::Clear),
            (2, WeatherCondition::PartlyCloudy),
            (3, WeatherCondition::Cloudy),
            (48, WeatherCondition::Fog),
            (53, WeatherCondition::Drizzle),
            (57, WeatherCondition::Sleet),
            (63, WeatherCondition::Rain),
            (80, WeatherCondition::Rain),
            (65, WeatherCondition::HeavyRain),
            (82, WeatherCondition::HeavyRain),
            (66, WeatherCondition::Sleet),
            (77, WeatherCondition::Snow),
            (86, WeatherCondition::Snow),
            (96, WeatherCondition::Thunderstorm),
            // Unknown codes read as clear
            (4, WeatherCondition::Clear),
            (-1, WeatherCondition::Clear),
        ];
        for (code, expected) in cases {
            assert_eq!(WeatherCondition::from_wmo_code(code), expected, "WMO code {}", code);
        }
    }

    #[test]
    fn test_unit_resolution_and_conversion() {
        assert_eq!(TemperatureUnit::Auto.resolved(), TemperatureUnit::Celsius);
        assert_eq!(TemperatureUnit::Celsius.to_celsius(21.0), 21.0);
        assert!((TemperatureUnit::Fahrenheit.to_celsius(86.0) - 30.0).abs() < 1e-9);
        assert_eq!(TemperatureUnit::Fahrenheit.symbol(), "°F");
    }

    #[test]
    fn test_api_errors_map_to_app_errors() {
        let app: pawwalk_core::AppError = WeatherError::Api {
            status: 503,
            message: "down".into(),
        }
        .into();
        assert_eq!(
            app.user_message(),
            "The forecast service is down. Try again later."
        );

        let app: pawwalk_core::AppError = WeatherError::Parse("bad json".into()).into();
        assert_eq!(app.user_message(), "Couldn't load the forecast.");
    }

    #[test]
    fn test_location_label_falls_back_to_coordinates() {
        let mut loc = Location::new(37.56651, 126.97801);
        assert_eq!(loc.label(), "37.567, 126.978");
        loc.city_name = Some("Seoul".into());
        assert_eq!(loc.label(), "Seoul");
    }
}
