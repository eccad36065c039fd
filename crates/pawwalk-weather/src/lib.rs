//! Weather service for PawWalk
//!
//! Provides forecasts via the Open-Meteo API, reverse geocoding for the
//! location label, pet-care advice derived from the forecast, and a
//! persistent forecast cache.

pub mod advice;
pub mod cache;
pub mod geocode;
pub mod provider;
pub mod types;

pub use advice::PetCareAdvice;
pub use cache::WeatherCache;
pub use geocode::Geocoder;
pub use provider::WeatherProvider;
pub use types::*;
