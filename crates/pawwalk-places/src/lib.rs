//! Nearby place search for PawWalk
//!
//! Google Places nearby search and details for veterinary clinics and
//! parks, plus a locally persisted favorites list.

pub mod client;
pub mod error;
pub mod favorites;
pub mod retry;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use favorites::FavoritesStore;
pub use retry::{with_retry, RetryConfig};
pub use types::*;
