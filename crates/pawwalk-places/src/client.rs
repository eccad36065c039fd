//! Google Places API client.

use std::time::Duration;

use pawwalk_core::PlacesConfig;
use tracing::instrument;
use url::Url;

use crate::error::PlacesError;
use crate::retry::{with_retry, RetryConfig};
use crate::types::{DetailsResponse, LatLng, NearbyResponse, Place, PlaceDetails, PlaceKind};

const PLACES_API_BASE: &str = "https://maps.googleapis.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const DETAILS_FIELDS: &str = "place_id,geometry,name,opening_hours,formatted_address,\
formatted_phone_number,website,photos,reviews";

pub struct PlacesClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language: Option<String>,
    retry: RetryConfig,
}

impl PlacesClient {
    pub fn new(api_key: &str) -> Result<Self, PlacesError> {
        Self::new_with_base_url(api_key, PLACES_API_BASE)
    }

    pub fn new_with_base_url(api_key: &str, base_url: &str) -> Result<Self, PlacesError> {
        if api_key.trim().is_empty() {
            return Err(PlacesError::MissingApiKey);
        }
        // Fail early on a malformed base URL
        Url::parse(base_url)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            language: None,
            retry: RetryConfig::default(),
        })
    }

    /// Client for the configured endpoint, language and key
    pub fn from_config(config: &PlacesConfig) -> Result<Self, PlacesError> {
        if !config.is_configured() {
            return Err(PlacesError::MissingApiKey);
        }
        let client = Self::new_with_base_url(&config.api_key, &config.api_url)?;
        Ok(client.with_language(&config.language))
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string()).filter(|l| !l.is_empty());
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Places of `kind` within `radius_m` of `location`.
    /// An empty result is not an error.
    #[instrument(skip(self), level = "info")]
    pub async fn nearby(
        &self,
        location: LatLng,
        kind: PlaceKind,
        radius_m: u32,
    ) -> Result<Vec<Place>, PlacesError> {
        let url = self.endpoint("/maps/api/place/nearbysearch/json")?;
        let mut query = vec![
            ("location", format!("{},{}", location.lat, location.lng)),
            ("radius", radius_m.to_string()),
            ("type", kind.api_type().to_string()),
        ];
        query.extend(self.common_params());

        let body: NearbyResponse = self.get_json(url, &query).await?;
        match body.status.as_str() {
            "OK" => {
                tracing::info!("Found {} nearby {:?} places", body.results.len(), kind);
                Ok(body.results)
            }
            "ZERO_RESULTS" => Ok(Vec::new()),
            status => Err(PlacesError::from_status(status, body.error_message)),
        }
    }

    #[instrument(skip(self), level = "info")]
    pub async fn details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.endpoint("/maps/api/place/details/json")?;
        let mut query = vec![
            ("place_id", place_id.to_string()),
            ("fields", DETAILS_FIELDS.to_string()),
        ];
        query.extend(self.common_params());

        let body: DetailsResponse = self.get_json(url, &query).await?;
        match (body.status.as_str(), body.result) {
            ("OK", Some(details)) => Ok(details),
            ("OK", None) => Err(PlacesError::NotFound(place_id.to_string())),
            ("NOT_FOUND", _) => Err(PlacesError::NotFound(place_id.to_string())),
            (status, _) => Err(PlacesError::from_status(status, body.error_message)),
        }
    }

    /// Image URL for a photo reference, scaled to `max_width` pixels
    pub fn photo_url(&self, photo_reference: &str, max_width: u32) -> Result<Url, PlacesError> {
        let mut url = self.endpoint("/maps/api/place/photo")?;
        url.query_pairs_mut()
            .append_pair("maxwidth", &max_width.to_string())
            .append_pair("photoreference", photo_reference)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, PlacesError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("key", self.api_key.clone())];
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        params
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> Result<T, PlacesError> {
        let response = with_retry(&self.retry, || {
            self.client.get(url.clone()).query(query).send()
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PlacesError::Api {
                status: status.to_string(),
                message: text,
            });
        }

        response.json().await.map_err(|e| PlacesError::Api {
            status: "INVALID_RESPONSE".to_string(),
            message: e.to_string(),
        })
    }
}
