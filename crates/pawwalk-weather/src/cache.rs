use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::types::{WeatherData, WeatherError};

/// Last fetched forecast, persisted as JSON between runs
#[derive(Debug)]
pub struct WeatherCache {
    cache_path: PathBuf,
    data: Option<WeatherData>,
}

impl WeatherCache {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            data: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.cache_path
    }

    /// Read the cache file. A missing or unreadable file leaves the cache empty.
    pub fn load(&mut self) -> Option<&WeatherData> {
        self.data = match std::fs::read_to_string(&self.cache_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::warn!("Discarding unreadable weather cache: {}", e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read weather cache: {}", e);
                None
            }
        };
        self.data.as_ref()
    }

    /// Replace the cached forecast and write it to disk
    pub fn store(&mut self, data: WeatherData) -> Result<(), WeatherError> {
        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| WeatherError::Cache(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(&data).map_err(|e| WeatherError::Cache(e.to_string()))?;
        std::fs::write(&self.cache_path, content)
            .map_err(|e| WeatherError::Cache(e.to_string()))?;

        tracing::debug!("Weather cache written to {}", self.cache_path.display());
        self.data = Some(data);
        Ok(())
    }

    pub fn get(&self) -> Option<&WeatherData> {
        self.data.as_ref()
    }

    /// Cached forecast if it was fetched less than `max_age_minutes` before `now`
    pub fn fresh(&self, max_age_minutes: u32, now: DateTime<Utc>) -> Option<&WeatherData> {
        self.data
            .as_ref()
            .filter(|data| now - data.fetched_at < Duration::minutes(i64::from(max_age_minutes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CurrentWeather, Location, TemperatureUnit, WeatherCondition};
    use tempfile::TempDir;

    fn sample(fetched_at: DateTime<Utc>) -> WeatherData {
        WeatherData {
            current: CurrentWeather {
                temperature: 21.5,
                feels_like: 20.0,
                humidity: 55,
                wind_speed: 8.0,
                condition: WeatherCondition::PartlyCloudy,
                updated_at: fetched_at,
            },
            forecast: vec![],
            location: Location::new(37.5665, 126.978),
            unit: TemperatureUnit::Celsius,
            fetched_at,
        }
    }

    #[test]
    fn test_store_then_load_in_new_cache() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("weather_cache.json");
        let now = Utc::now();

        let mut cache = WeatherCache::new(&path);
        cache.store(sample(now)).unwrap();

        let mut reopened = WeatherCache::new(&path);
        assert_eq!(reopened.load(), Some(&sample(now)));
    }

    #[test]
    fn test_missing_and_corrupt_files_load_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("weather_cache.json");

        let mut cache = WeatherCache::new(&path);
        assert!(cache.load().is_none());

        std::fs::write(&path, "{not json").unwrap();
        assert!(cache.load().is_none());
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_freshness_window() {
        let temp = TempDir::new().unwrap();
        let fetched = Utc::now();
        let mut cache = WeatherCache::new(temp.path().join("c.json"));
        cache.store(sample(fetched)).unwrap();

        assert!(cache.fresh(15, fetched + Duration::minutes(14)).is_some());
        assert!(cache.fresh(15, fetched + Duration::minutes(15)).is_none());
        assert!(cache.fresh(0, fetched).is_none());
    }
}
