//! Forecast provider backed by the Open-Meteo API (no API key required).

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{
    CurrentWeather, DayForecast, Location, TemperatureUnit, WeatherCondition, WeatherData,
    WeatherError,
};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const FORECAST_DAYS: u8 = 7;
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max,sunrise,sunset";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    weather_code: i32,
}

/// Open-Meteo returns daily values as parallel arrays
#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<NaiveDate>,
    weather_code: Vec<Option<i32>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    sunrise: Vec<Option<String>>,
    #[serde(default)]
    sunset: Vec<Option<String>>,
}

impl DailyBlock {
    fn into_days(self) -> Result<Vec<DayForecast>, WeatherError> {
        let len = self.time.len();
        if self.temperature_2m_max.len() != len
            || self.temperature_2m_min.len() != len
            || self.weather_code.len() != len
        {
            return Err(WeatherError::Parse(
                "daily arrays have mismatched lengths".to_string(),
            ));
        }

        let mut days = Vec::with_capacity(len);
        for (i, date) in self.time.into_iter().enumerate() {
            // Days the model has no temperatures for are skipped
            let (Some(high), Some(low)) = (self.temperature_2m_max[i], self.temperature_2m_min[i])
            else {
                tracing::debug!("Skipping forecast day {} without temperatures", date);
                continue;
            };

            days.push(DayForecast {
                date,
                high,
                low,
                condition: WeatherCondition::from_wmo_code(self.weather_code[i].unwrap_or(0)),
                precipitation_chance: self
                    .precipitation_probability_max
                    .get(i)
                    .copied()
                    .flatten()
                    .map(|p| p.clamp(0.0, 100.0).round() as u8)
                    .unwrap_or(0),
                sunrise: self.sunrise.get(i).and_then(|s| parse_local_time(s.as_deref())),
                sunset: self.sunset.get(i).and_then(|s| parse_local_time(s.as_deref())),
            });
        }
        Ok(days)
    }
}

/// Parse Open-Meteo's `YYYY-MM-DDTHH:MM` local timestamps
fn parse_local_time(value: Option<&str>) -> Option<NaiveTime> {
    NaiveDateTime::parse_from_str(value?, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|dt| dt.time())
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    unit: TemperatureUnit,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(unit: TemperatureUnit, base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            unit: unit.resolved(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Fetch current conditions and a daily forecast for `location`
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, location: &Location) -> Result<WeatherData, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let temperature_unit = match self.unit {
            TemperatureUnit::Fahrenheit => "fahrenheit",
            _ => "celsius",
        };

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("temperature_unit", temperature_unit.to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Forecast request failed with {}: {}", status, message);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        let now = Utc::now();
        let current = CurrentWeather {
            temperature: parsed.current.temperature_2m,
            feels_like: parsed.current.apparent_temperature,
            humidity: parsed.current.relative_humidity_2m.clamp(0.0, 100.0).round() as u8,
            wind_speed: parsed.current.wind_speed_10m,
            condition: WeatherCondition::from_wmo_code(parsed.current.weather_code),
            updated_at: now,
        };
        let forecast = parsed.daily.into_days()?;

        tracing::info!(
            "Fetched weather for {}: {:.1}{} {}, {} forecast days",
            location.label(),
            current.temperature,
            self.unit.symbol(),
            current.condition.description(),
            forecast.len()
        );

        Ok(WeatherData {
            current,
            forecast,
            location: location.clone(),
            unit: self.unit,
            fetched_at: now,
        })
    }
}
