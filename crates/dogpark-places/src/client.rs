//! HTTP client for the Places API (v1).
//!
//! Wraps `reqwest` with API key handling, URL construction, and typed
//! response decoding. Non-success statuses are surfaced as
//! [`PlacesError::ServiceRejected`] carrying the service's `error.message`.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::types::{
    ErrorEnvelope, NearbySearchBody, NearbySearchResponse, PlaceDetail, PlaceSummary,
    SearchRequest, DETAIL_FIELDS, LANGUAGE_CODE, NEARBY_FIELD_MASK,
};

const DEFAULT_BASE_URL: &str = "https://places.googleapis.com/v1/";
const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

/// The two calls the search pipeline needs from a places provider, plus the
/// photo URL template it embeds in popups.
pub trait PlacesApi {
    /// Nearby search within the request's circle.
    fn search_nearby(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Vec<PlaceSummary>, PlacesError>> + Send;

    /// Photos, reviews, name, address and location for one place.
    fn place_details(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<PlaceDetail, PlacesError>> + Send;

    /// URL of a photo's media, bounded to `max_px` on both edges.
    fn photo_url(&self, photo_name: &str, max_px: u32) -> String;
}

/// Client for the Places API.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl PlacesClient {
    /// Creates a new client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let invalid = |reason: String| PlacesError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) URL".to_string()));
        }

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
        })
    }

    /// Runs `POST places:searchNearby` for dog parks in the request's circle.
    ///
    /// Only the first page (at most 20 places) is returned.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::ServiceRejected`] on a non-success status.
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn search_nearby(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        let url = self.endpoint(&["places:searchNearby"]);
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(FIELD_MASK_HEADER, NEARBY_FIELD_MASK)
            .json(&NearbySearchBody::from(request))
            .send()
            .await?;

        let body: NearbySearchResponse = Self::read_json(response, "searchNearby").await?;
        Ok(body.places)
    }

    /// Runs `GET places/{id}` for photos, reviews, name, address and location.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::ServiceRejected`] on a non-success status.
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetail, PlacesError> {
        let url = self.details_url(place_id);
        let response = self.client.get(url).send().await?;
        Self::read_json(response, &format!("placeDetails(id={place_id})")).await
    }

    /// Media URL for a photo resource name.
    #[must_use]
    pub fn photo_media_url(&self, photo_name: &str, max_px: u32) -> Url {
        let mut segments: Vec<&str> = photo_name.split('/').filter(|s| !s.is_empty()).collect();
        segments.push("media");
        let mut url = self.endpoint(&segments);
        let max_px = max_px.to_string();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("maxHeightPx", &max_px)
            .append_pair("maxWidthPx", &max_px);
        url
    }

    fn details_url(&self, place_id: &str) -> Url {
        let mut url = self.endpoint(&["places", place_id]);
        url.query_pairs_mut()
            .append_pair("fields", DETAIL_FIELDS)
            .append_pair("key", &self.api_key)
            .append_pair("languageCode", LANGUAGE_CODE);
        url
    }

    /// Appends percent-encoded path segments to the base URL.
    ///
    /// Segments are pushed one by one rather than joined as a relative URL,
    /// because `places:searchNearby` would otherwise parse as a URL scheme.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        // Cannot fail: the constructor rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Decodes a success body as `T`, or turns a non-success status into
    /// [`PlacesError::ServiceRejected`] with the service's error message.
    async fn read_json<T: DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, PlacesError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message);
            return Err(PlacesError::ServiceRejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

impl PlacesApi for PlacesClient {
    async fn search_nearby(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        PlacesClient::search_nearby(self, request).await
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetail, PlacesError> {
        PlacesClient::place_details(self, place_id).await
    }

    fn photo_url(&self, photo_name: &str, max_px: u32) -> String {
        self.photo_media_url(photo_name, max_px).into()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
