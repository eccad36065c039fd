//! Reverse geocoding: convert coordinates to a city label.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::types::{Location, WeatherError};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("PawWalk/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state_district: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// Most specific populated place, falling back to the region
    fn place_name(self) -> Option<String> {
        [
            self.city,
            self.town,
            self.village,
            self.municipality,
            self.state_district,
            self.county,
            self.state,
            self.country,
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    language: Option<String>,
}

impl Geocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: None,
        })
    }

    /// Preferred result language, e.g. "ko"
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Reverse geocode to a place name (e.g. "Seoul").
    /// Returns `None` on failure; the caller can fall back to coordinates.
    pub async fn reverse(&self, location: &Location) -> Option<String> {
        if location.city_name.is_some() {
            return location.city_name.clone();
        }

        let url = format!("{}/reverse", self.base_url);
        let mut query = vec![
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("zoom", "10".to_string()),
        ];
        if let Some(language) = &self.language {
            query.push(("accept-language", language.clone()));
        }

        let response = match self.client.get(&url).query(&query).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let name = body.address?.place_name()?;
        tracing::info!("Reverse geocoded to: {}", name);
        Some(name)
    }

    /// Copy of `location` labelled with its place name when one resolves
    pub async fn label(&self, location: &Location) -> Location {
        let mut labelled = location.clone();
        labelled.city_name = self.reverse(location).await;
        labelled
    }
}
