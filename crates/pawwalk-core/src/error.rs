//! Centralized error types for the PawWalk application.
//!
//! Library crates keep their own error enums and convert into `AppError`
//! at the edge. Every variant maps to a short message through
//! `user_message()`.

use thiserror::Error;

/// Error type the UI layer deals with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("network: {0}")]
    Network(#[from] NetworkError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("weather: {0}")]
    Weather(#[from] WeatherError),

    #[error("places: {0}")]
    Places(#[from] PlacesError),

    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("walk: {0}")]
    Walk(#[from] WalkError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Failure from another crate, carried by message only
    #[error("service: {0}")]
    Service(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Short message fit for a toast or status line
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::Config(e) => e.user_message(),
            Self::Weather(e) => e.user_message(),
            Self::Places(e) => e.user_message(),
            Self::Storage(e) => e.user_message(),
            Self::Walk(e) => e.user_message(),
            Self::Io(_) => "Couldn't access local files.",
            Self::Service(_) | Self::Other(_) => "Something went wrong. Try again in a moment.",
        }
    }
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("could not connect: {0}")]
    ConnectionFailed(String),

    #[error("timed out")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ConnectionFailed(_) => "You appear to be offline.",
            Self::Timeout => "The server took too long to answer.",
            Self::ServerError { status, .. } if *status >= 500 => {
                "The service is having trouble right now."
            }
            Self::ServerError { .. } | Self::InvalidResponse(_) => {
                "The service sent a response we couldn't use."
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error("missing setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "A setting has an invalid value.",
            Self::MissingSetting(_) => "A required setting is missing.",
        }
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("service unavailable")]
    ServiceUnavailable,

    #[error("cache: {0}")]
    CacheError(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ApiError(_) => "Couldn't load the forecast.",
            Self::ServiceUnavailable => "The forecast service is down. Try again later.",
            Self::CacheError(_) => "The saved forecast may be out of date.",
        }
    }
}

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("API key rejected")]
    InvalidApiKey,

    #[error("no such place: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    ApiError(String),
}

impl PlacesError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidApiKey => "The Maps API key was rejected.",
            Self::NotFound(_) => "That place is no longer listed.",
            Self::ApiError(_) => "Couldn't search nearby places.",
        }
    }
}

/// Favorites and cache files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not write {0}")]
    WriteFailed(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::WriteFailed(_) => "Couldn't save your changes.",
        }
    }
}

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("bad goal distance: {0}")]
    InvalidGoal(String),

    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("not allowed now: {0}")]
    InvalidState(String),
}

impl WalkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidGoal(_) => "Please enter a valid goal distance.",
            Self::SensorUnavailable(_) => "Location or step sensor unavailable. Check permissions.",
            Self::InvalidState(_) => "That action isn't available right now.",
        }
    }
}

/// Classify `reqwest` failures for the UI
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            return NetworkError::Timeout;
        }
        match self.status() {
            Some(status) => NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            },
            None if self.is_decode() => NetworkError::InvalidResponse(self.to_string()),
            None => NetworkError::ConnectionFailed(self.to_string()),
        }
    }
}
