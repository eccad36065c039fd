use anyhow::Result;
use chrono::Utc;
use pawwalk_core::{AppError, Config};
use pawwalk_places::FavoritesStore;
use pawwalk_weather::{
    Geocoder, Location, PetCareAdvice, TemperatureUnit, WeatherCache, WeatherData, WeatherProvider,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    pawwalk_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    tracing::info!("PawWalk started");

    println!("PawWalk - walk tracking & pet-care forecast");
    println!("  Config directory: {}", config.config_dir.display());

    let favorites = FavoritesStore::load(config.favorites_path());
    println!("  Favorite places: {}", favorites.len());

    let Some((latitude, longitude)) = config.weather.home() else {
        println!("\nSet weather.home_latitude and weather.home_longitude to see the forecast.");
        return Ok(());
    };

    match forecast(&config, Location::new(latitude, longitude)).await {
        Ok(data) => print_forecast(&data),
        Err(e) => {
            tracing::error!("Forecast unavailable: {}", e);
            eprintln!("\n{}", e.user_message());
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Cached forecast while fresh, otherwise a new fetch. A stale cache is
/// still shown when the fetch fails.
async fn forecast(config: &Config, home: Location) -> Result<WeatherData, AppError> {
    let mut cache = WeatherCache::new(config.weather_cache_path());
    cache.load();

    let fresh = cache.fresh(config.weather.refresh_minutes, Utc::now());
    if let Some(data) = fresh.filter(|data| same_place(data, &home)) {
        tracing::debug!("Using cached forecast from {}", data.fetched_at);
        return Ok(data.clone());
    }

    let unit = TemperatureUnit::from(config.weather.temperature_unit);
    let provider = WeatherProvider::new(unit, &config.weather.api_url)?;
    let geocoder =
        Geocoder::new(&config.weather.geocode_url)?.with_language(&config.places.language);

    let location = geocoder.label(&home).await;
    match provider.fetch(&location).await {
        Ok(data) => {
            if let Err(e) = cache.store(data.clone()) {
                tracing::warn!("Failed to cache forecast: {}", e);
            }
            Ok(data)
        }
        Err(e) => match cache.get().filter(|data| same_place(data, &home)) {
            Some(stale) => {
                tracing::warn!("Fetch failed, showing forecast from {}: {}", stale.fetched_at, e);
                Ok(stale.clone())
            }
            None => Err(e.into()),
        },
    }
}

/// Whether a cached forecast was fetched for `home`
fn same_place(data: &WeatherData, home: &Location) -> bool {
    data.location.latitude == home.latitude && data.location.longitude == home.longitude
}

fn print_forecast(data: &WeatherData) {
    let symbol = data.unit.symbol();
    println!(
        "\n{}: {:.0}{} (feels like {:.0}{}), {}",
        data.location.label(),
        data.current.temperature,
        symbol,
        data.current.feels_like,
        symbol,
        data.current.condition.description()
    );

    for day in &data.forecast {
        let advice = PetCareAdvice::for_day(day, data.unit);
        println!(
            "\n{}  {:.0}{} / {:.0}{}  {}  rain {}%",
            day.date.format("%a %m/%d"),
            day.high,
            symbol,
            day.low,
            symbol,
            day.condition.description(),
            day.precipitation_chance
        );
        println!("  {}", advice.condition_tip);
        println!("  {}", advice.temperature_tip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawwalk_weather::{CurrentWeather, WeatherCondition};
    use wiremock::matchers::any;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cached_at(latitude: f64, longitude: f64) -> WeatherData {
        let mut location = Location::new(latitude, longitude);
        location.city_name = Some("Seoul".into());
        WeatherData {
            current: CurrentWeather {
                temperature: 21.0,
                feels_like: 20.0,
                humidity: 50,
                wind_speed: 3.0,
                condition: WeatherCondition::Clear,
                updated_at: Utc::now(),
            },
            forecast: Vec::new(),
            location,
            unit: TemperatureUnit::Celsius,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_cached_forecast_matches_home_by_coordinates() {
        let data = cached_at(37.5665, 126.978);
        assert!(same_place(&data, &Location::new(37.5665, 126.978)));
    }

    #[test]
    fn test_forecast_for_old_home_is_not_reused() {
        let data = cached_at(37.5665, 126.978);
        assert!(!same_place(&data, &Location::new(35.1796, 129.0756)));
    }

    #[tokio::test]
    async fn test_stale_forecast_for_another_place_is_not_shown() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.config_dir = dir.path().to_path_buf();
        config.weather.api_url = server.uri();
        config.weather.geocode_url = server.uri();
        // Never fresh, so every call goes to the failing server
        config.weather.refresh_minutes = 0;

        let mut cache = WeatherCache::new(config.weather_cache_path());
        cache.store(cached_at(37.5665, 126.978)).unwrap();

        let result = forecast(&config, Location::new(35.1796, 129.0756)).await;
        assert!(result.is_err());

        let stale = forecast(&config, Location::new(37.5665, 126.978)).await.unwrap();
        assert_eq!(stale.location.city_name.as_deref(), Some("Seoul"));
    }
}
