//! Pet-care tips derived from a forecast.

use serde::Serialize;

use crate::types::{DayForecast, TemperatureUnit, WeatherCondition};

const HOT_C: f64 = 30.0;
const MILD_C: f64 = 20.0;
const CHILLY_C: f64 = 10.0;

/// Pair of tips shown alongside a forecast day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PetCareAdvice {
    pub condition_tip: &'static str,
    pub temperature_tip: &'static str,
}

impl PetCareAdvice {
    /// Advice for a forecast day. Temperatures are judged in Celsius on the
    /// mean of the day's high and low.
    pub fn for_day(day: &DayForecast, unit: TemperatureUnit) -> Self {
        Self::for_conditions(day.condition, unit.to_celsius(day.mean_temperature()))
    }

    pub fn for_conditions(condition: WeatherCondition, temperature_c: f64) -> Self {
        Self {
            condition_tip: condition_tip(condition),
            temperature_tip: temperature_tip(temperature_c),
        }
    }
}

fn condition_tip(condition: WeatherCondition) -> &'static str {
    match condition {
        WeatherCondition::Clear => "Clear skies today! A great day for a walk with your pet.",
        WeatherCondition::PartlyCloudy | WeatherCondition::Cloudy => {
            "It's cloudy. Your pet may feel a little gloomy."
        }
        WeatherCondition::Rain | WeatherCondition::HeavyRain | WeatherCondition::Sleet => {
            "Rain is coming down! Keep your pet safe indoors."
        }
        WeatherCondition::Thunderstorm => "Thunder and lightning. Your pet may be frightened!",
        WeatherCondition::Snow => "It's snowing! Put booties on to protect their paws.",
        WeatherCondition::Fog => "Foggy with poor visibility. Take care on walks.",
        WeatherCondition::Drizzle => "Have a happy day with your pet!",
    }
}

fn temperature_tip(celsius: f64) -> &'static str {
    if celsius >= HOT_C {
        "It's hot! Give your pet plenty of water so they don't overheat."
    } else if celsius >= MILD_C {
        "Comfortable temperature. Perfect for a walk!"
    } else if celsius >= CHILLY_C {
        "A bit chilly. Your pet may feel the cold."
    } else {
        "It's cold! Keep your pet warm."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(condition: WeatherCondition, high: f64, low: f64) -> DayForecast {
        DayForecast {
            date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            high,
            low,
            condition,
            precipitation_chance: 0,
            sunrise: None,
            sunset: None,
        }
    }

    #[test]
    fn test_temperature_bands_are_inclusive_at_lower_edge() {
        assert_eq!(temperature_tip(30.0), temperature_tip(35.0));
        assert_ne!(temperature_tip(29.9), temperature_tip(30.0));
        assert_eq!(temperature_tip(20.0), "Comfortable temperature. Perfect for a walk!");
        assert_eq!(temperature_tip(10.0), "A bit chilly. Your pet may feel the cold.");
        assert_eq!(temperature_tip(9.9), "It's cold! Keep your pet warm.");
    }

    #[test]
    fn test_for_day_uses_mean_temperature() {
        // mean 25
        let forecast = day(WeatherCondition::Clear, 32.0, 18.0);
        let advice = PetCareAdvice::for_day(&forecast, TemperatureUnit::Celsius);
        assert_eq!(advice.temperature_tip, "Comfortable temperature. Perfect for a walk!");
        assert_eq!(
            advice.condition_tip,
            "Clear skies today! A great day for a walk with your pet."
        );
    }

    #[test]
    fn test_for_day_converts_fahrenheit() {
        // mean 88°F is about 31°C
        let forecast = day(WeatherCondition::Snow, 92.0, 84.0);
        let advice = PetCareAdvice::for_day(&forecast, TemperatureUnit::Fahrenheit);
        assert_eq!(
            advice.temperature_tip,
            "It's hot! Give your pet plenty of water so they don't overheat."
        );
        assert_eq!(advice.condition_tip, "It's snowing! Put booties on to protect their paws.");
    }

    #[test]
    fn test_drizzle_gets_general_tip() {
        let advice = PetCareAdvice::for_conditions(WeatherCondition::Drizzle, 15.0);
        assert_eq!(advice.condition_tip, "Have a happy day with your pet!");
    }
}
