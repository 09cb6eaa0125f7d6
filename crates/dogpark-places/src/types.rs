//! Places API (v1) request and response types.
//!
//! Field names follow the service's camelCase JSON. Everything the service may
//! omit is an `Option` or a defaulted `Vec`; the pipeline decides what a
//! missing field means.

use dogpark_core::{LatLng, SearchArea, MAX_SEARCH_RADIUS_METERS};
use serde::{Deserialize, Serialize};

use crate::error::PlacesError;

/// Place type requested from the nearby search.
pub const DOG_PARK_TYPE: &str = "dog_park";

/// Service-side ceiling on nearby search results. No further pages are requested.
pub const MAX_RESULT_COUNT: u32 = 20;

pub const LANGUAGE_CODE: &str = "en-US";
pub const REGION_CODE: &str = "SE";

/// Fields requested from the nearby search via `X-Goog-FieldMask`.
pub const NEARBY_FIELD_MASK: &str =
    "places.displayName,places.formattedAddress,places.location,places.id";

/// Fields requested from the place details endpoint.
pub const DETAIL_FIELDS: &str = "photos,reviews,displayName,formattedAddress,location";

/// A validated search circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    center: LatLng,
    radius_meters: f64,
}

impl SearchRequest {
    /// Builds a request, clamping the radius to [`MAX_SEARCH_RADIUS_METERS`].
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::InvalidRequest`] for an out-of-range center or a
    /// radius that is not a positive finite number.
    pub fn new(center: LatLng, radius_meters: f64) -> Result<Self, PlacesError> {
        if !center.is_valid() {
            return Err(PlacesError::InvalidRequest(format!(
                "center {center} is outside the valid coordinate range"
            )));
        }
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(PlacesError::InvalidRequest(format!(
                "radius must be a positive number of meters, got {radius_meters}"
            )));
        }
        Ok(Self {
            center,
            radius_meters: radius_meters.min(MAX_SEARCH_RADIUS_METERS),
        })
    }

    #[must_use]
    pub fn center(&self) -> LatLng {
        self.center
    }

    #[must_use]
    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    #[must_use]
    pub fn area(&self) -> SearchArea {
        SearchArea {
            center: self.center,
            radius_meters: self.radius_meters,
        }
    }
}

impl TryFrom<SearchArea> for SearchRequest {
    type Error = PlacesError;

    fn try_from(area: SearchArea) -> Result<Self, Self::Error> {
        Self::new(area.center, area.radius_meters)
    }
}

// ---------------------------------------------------------------------------
// searchNearby
// ---------------------------------------------------------------------------

/// JSON body for `POST places:searchNearby`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbySearchBody {
    pub included_types: Vec<String>,
    pub max_result_count: u32,
    pub location_restriction: LocationRestriction,
    pub language_code: String,
    pub region_code: String,
}

impl From<&SearchRequest> for NearbySearchBody {
    fn from(request: &SearchRequest) -> Self {
        Self {
            included_types: vec![DOG_PARK_TYPE.to_string()],
            max_result_count: MAX_RESULT_COUNT,
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: ApiLatLng::from(request.center),
                    radius: request.radius_meters,
                },
            },
            language_code: LANGUAGE_CODE.to_string(),
            region_code: REGION_CODE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocationRestriction {
    pub circle: Circle,
}

#[derive(Debug, Serialize)]
pub struct Circle {
    pub center: ApiLatLng,
    pub radius: f64,
}

/// The service's `{latitude, longitude}` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiLatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LatLng> for ApiLatLng {
    fn from(p: LatLng) -> Self {
        Self {
            latitude: p.lat,
            longitude: p.lng,
        }
    }
}

impl From<ApiLatLng> for LatLng {
    fn from(p: ApiLatLng) -> Self {
        LatLng::new(p.latitude, p.longitude)
    }
}

/// `{ "text": ..., "languageCode": ... }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NearbySearchResponse {
    /// Omitted entirely by the service when nothing matched.
    #[serde(default)]
    pub places: Vec<PlaceSummary>,
}

/// One nearby search hit, restricted by [`NEARBY_FIELD_MASK`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub location: Option<ApiLatLng>,
}

// ---------------------------------------------------------------------------
// place details
// ---------------------------------------------------------------------------

/// Response of `GET places/{id}` restricted by [`DETAIL_FIELDS`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub location: Option<ApiLatLng>,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl PlaceDetail {
    /// Display name text, if the service sent a non-empty one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.display_name
            .as_ref()
            .and_then(|n| n.text.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Ratings of the reviews that carry one.
    #[must_use]
    pub fn ratings(&self) -> Vec<f64> {
        self.reviews.iter().filter_map(|r| r.rating).collect()
    }
}

/// Photo resource name, e.g. `places/{placeId}/photos/{ref}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRef {
    pub name: String,
    #[serde(default)]
    pub width_px: Option<u32>,
    #[serde(default)]
    pub height_px: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Review {
    /// 1..=5 for real reviews.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub text: Option<LocalizedText>,
}

impl Review {
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.text
            .as_ref()
            .and_then(|t| t.text.as_deref())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

/// Error envelope: `{ "error": { "code": 400, "message": "...", "status": "INVALID_ARGUMENT" } }`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
