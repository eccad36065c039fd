//! Places-specific error types.

use pawwalk_core::error::ReqwestErrorExt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Places API key is not configured")]
    MissingApiKey,

    #[error("Request denied: {0}")]
    RequestDenied(String),

    #[error("Place not found: {0}")]
    NotFound(String),

    #[error("Quota exceeded")]
    OverQueryLimit,

    #[error("API error: {status}: {message}")]
    Api { status: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Favorites storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl PlacesError {
    /// Map a non-OK Places `status` field to an error
    pub fn from_status(status: &str, message: Option<String>) -> Self {
        let message = message.unwrap_or_default();
        match status {
            "REQUEST_DENIED" => Self::RequestDenied(message),
            "NOT_FOUND" => Self::NotFound(message),
            "OVER_QUERY_LIMIT" => Self::OverQueryLimit,
            other => Self::Api {
                status: other.to_string(),
                message,
            },
        }
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => "Add a Maps API key in settings to search nearby.".to_string(),
            Self::RequestDenied(_) => "Maps API key was rejected. Check settings.".to_string(),
            Self::NotFound(_) => "That place could not be found.".to_string(),
            Self::OverQueryLimit => "Too many searches. Please wait a moment.".to_string(),
            Self::Api { status, .. } => format!("Place search failed ({})", status),
            Self::InvalidUrl(_) => "The Places API URL is invalid. Check settings.".to_string(),
            Self::Storage(_) => "Unable to save favorites.".to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OverQueryLimit | Self::Network(_))
    }
}

impl From<PlacesError> for pawwalk_core::AppError {
    fn from(e: PlacesError) -> Self {
        use pawwalk_core::{ConfigError, StorageError};
        match e {
            PlacesError::MissingApiKey => {
                ConfigError::MissingSetting("places.api_key".to_string()).into()
            }
            PlacesError::RequestDenied(_) => pawwalk_core::PlacesError::InvalidApiKey.into(),
            PlacesError::NotFound(id) => pawwalk_core::PlacesError::NotFound(id).into(),
            PlacesError::InvalidUrl(e) => ConfigError::Invalid(e.to_string()).into(),
            PlacesError::Storage(msg) => StorageError::WriteFailed(msg).into(),
            PlacesError::Network(e) => e.into_network_error().into(),
            other => pawwalk_core::PlacesError::ApiError(other.to_string()).into(),
        }
    }
}
