use serde::{Deserialize, Serialize};

/// Category of place to search for around the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Veterinary,
    Park,
}

impl PlaceKind {
    /// Google Places `type` filter
    pub fn api_type(&self) -> &'static str {
        match self {
            Self::Veterinary => "veterinary_care",
            Self::Park => "park",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Veterinary => "Animal hospital",
            Self::Park => "Park",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// Nearby search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

impl Place {
    pub fn location(&self) -> LatLng {
        self.geometry.location
    }

    pub fn open_now(&self) -> Option<bool> {
        self.opening_hours.as_ref().and_then(|h| h.open_now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacePhoto {
    pub photo_reference: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author_name: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub relative_time_description: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub time: i64,
}

/// Full place record from the details endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    pub name: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub photos: Vec<PlacePhoto>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl PlaceDetails {
    /// Up to `n` reviews in the order the API returned them
    pub fn top_reviews(&self, n: usize) -> &[Review] {
        &self.reviews[..self.reviews.len().min(n)]
    }

    /// Plain-text summary for sharing: name, address and website
    pub fn share_text(&self) -> String {
        [
            Some(self.name.as_str()),
            self.formatted_address.as_deref(),
            self.website.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
    }

    /// Summary record suitable for the favorites list
    pub fn to_place(&self) -> Place {
        Place {
            place_id: self.place_id.clone(),
            name: self.name.clone(),
            vicinity: self.formatted_address.clone(),
            geometry: self.geometry,
            rating: None,
            opening_hours: self.opening_hours.clone(),
        }
    }
}

/// Envelope shared by nearby search responses
#[derive(Debug, Deserialize)]
pub(crate) struct NearbyResponse {
    #[serde(default)]
    pub results: Vec<Place>,
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    #[serde(default)]
    pub result: Option<PlaceDetails>,
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}
