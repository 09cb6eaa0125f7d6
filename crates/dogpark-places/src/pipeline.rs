//! Dog park search: nearby search, per-place details, markers.
//!
//! A search clears the board, runs one nearby search, then fetches details
//! for each hit and adds a marker for every place that came back with a
//! location. Failures of the nearby search abort the whole search and are
//! meant for the user; failures of a single detail fetch only skip that place
//! and are logged.
//!
//! Detail fetches go through `buffered(detail_concurrency)`. With the default
//! of 1 they run strictly one after another; with more, several are in flight
//! but markers are still added in nearby-search order.

use std::time::Duration;

use dogpark_core::{
    average_rating, viewport_search_area, AppConfig, LatLng, Region, RegionRegistry, SearchArea,
    ViewportBounds,
};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;

use crate::client::PlacesApi;
use crate::error::PlacesError;
use crate::markers::{MarkerEntry, SearchTicket, SharedBoard};
use crate::popup::render_popup;
use crate::types::{PlaceDetail, SearchRequest};

/// Zoom level the map moves to when a region is selected.
pub const REGION_ZOOM: u8 = 10;

pub const NO_RESULTS_MESSAGE: &str = "No dog parks found in this area.";

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub detail_concurrency: usize,
    pub photo_max_px: u32,
    pub region_radius_meters: f64,
    pub viewport_radius_cap_meters: f64,
    /// Pause between clearing the board and a viewport search's query.
    pub viewport_search_delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            detail_concurrency: 1,
            photo_max_px: 200,
            region_radius_meters: 50_000.0,
            viewport_radius_cap_meters: 30_000.0,
            viewport_search_delay: Duration::ZERO,
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            detail_concurrency: config.detail_concurrency,
            photo_max_px: config.photo_max_px,
            region_radius_meters: config.region_radius_meters,
            viewport_radius_cap_meters: config.viewport_radius_cap_meters,
            viewport_search_delay: Duration::from_millis(config.viewport_search_delay_ms),
        }
    }
}

/// Whole-search failures. These are shown to the user.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search area: {0}")]
    InvalidArea(String),

    #[error("nearby search rejected with status {status}")]
    ServiceRejected {
        status: u16,
        message: Option<String>,
    },

    #[error("nearby search failed: {0}")]
    Transport(#[source] PlacesError),
}

impl SearchError {
    /// Alert text for the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SearchError::InvalidArea(reason) => format!("Cannot search this area: {reason}"),
            SearchError::ServiceRejected { status, message } => format!(
                "Error searching for dog parks: {status} - {}",
                message.as_deref().unwrap_or("See logs for details.")
            ),
            SearchError::Transport(_) => {
                "Error fetching dog park data. See logs for details.".to_string()
            }
        }
    }
}

impl From<PlacesError> for SearchError {
    fn from(err: PlacesError) -> Self {
        match err {
            PlacesError::ServiceRejected { status, message } => {
                SearchError::ServiceRejected { status, message }
            }
            PlacesError::InvalidRequest(reason) => SearchError::InvalidArea(reason),
            other => SearchError::Transport(other),
        }
    }
}

/// Why a nearby search hit did not become a marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    MissingId,
    DetailFetchFailed(String),
    MissingLocation,
    /// A newer search cleared the board before this marker was ready.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedPlace {
    pub place_id: Option<String>,
    pub reason: SkipReason,
}

/// Result of a search that reached the service successfully.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub area: SearchArea,
    pub places_found: usize,
    pub markers_added: usize,
    pub skipped: Vec<SkippedPlace>,
}

impl SearchReport {
    /// Informational message for the user, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&'static str> {
        (self.places_found == 0).then_some(NO_RESULTS_MESSAGE)
    }
}

/// Where the map should move after a region is selected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

#[derive(Debug)]
pub struct RegionSearch {
    pub region: Region,
    pub view: MapView,
    pub result: Result<SearchReport, SearchError>,
}

/// Runs searches against a [`PlacesApi`] and publishes markers to a board.
pub struct SearchPipeline<P> {
    api: P,
    board: SharedBoard,
    options: PipelineOptions,
}

impl<P: PlacesApi + Sync> SearchPipeline<P> {
    pub fn new(api: P, board: SharedBoard, options: PipelineOptions) -> Self {
        Self {
            api,
            board,
            options,
        }
    }

    #[must_use]
    pub fn board(&self) -> &SharedBoard {
        &self.board
    }

    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Clears the board, then searches `radius_meters` around `center`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when the area is invalid or the nearby search
    /// fails. The board stays empty in that case.
    pub async fn search(
        &self,
        center: LatLng,
        radius_meters: f64,
    ) -> Result<SearchReport, SearchError> {
        let request = SearchRequest::new(center, radius_meters)?;
        let ticket = self.board.lock().await.clear_all();
        self.run(ticket, &request).await
    }

    /// Looks up `identifier` and searches around the region's center.
    ///
    /// Returns `None`, without touching the board, when the identifier is
    /// unknown.
    pub async fn search_region(
        &self,
        registry: &RegionRegistry,
        identifier: &str,
    ) -> Option<RegionSearch> {
        let Some(region) = registry.lookup(identifier) else {
            tracing::debug!(identifier, "ignoring unknown region selection");
            return None;
        };
        let center = region.center();
        tracing::info!(region = %region.identifier, "searching region");
        let result = self
            .search(center, self.options.region_radius_meters)
            .await;
        Some(RegionSearch {
            region: region.clone(),
            view: MapView {
                center,
                zoom: REGION_ZOOM,
            },
            result,
        })
    }

    /// Searches the visible map area.
    ///
    /// The board is cleared right away; the query itself waits for
    /// `viewport_search_delay` first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidArea`] (before clearing) for malformed
    /// bounds, otherwise as [`SearchPipeline::search`].
    pub async fn search_viewport(
        &self,
        bounds: &ViewportBounds,
    ) -> Result<SearchReport, SearchError> {
        let area = viewport_search_area(bounds, self.options.viewport_radius_cap_meters)
            .map_err(|e| SearchError::InvalidArea(e.to_string()))?;
        let request = SearchRequest::try_from(area)?;

        let ticket = self.board.lock().await.clear_all();
        if !self.options.viewport_search_delay.is_zero() {
            tokio::time::sleep(self.options.viewport_search_delay).await;
        }
        self.run(ticket, &request).await
    }

    async fn run(
        &self,
        ticket: SearchTicket,
        request: &SearchRequest,
    ) -> Result<SearchReport, SearchError> {
        let center = request.center();
        let radius_meters = request.radius_meters();

        let places = match self.api.search_nearby(request).await {
            Ok(places) => places,
            Err(err) => {
                tracing::error!(%center, radius_meters, error = %err, "nearby search failed");
                return Err(err.into());
            }
        };

        let mut report = SearchReport {
            area: request.area(),
            places_found: places.len(),
            markers_added: 0,
            skipped: Vec::new(),
        };

        if places.is_empty() {
            tracing::info!(%center, radius_meters, "no dog parks found");
            return Ok(report);
        }

        let api = &self.api;
        let mut details = stream::iter(places)
            .map(move |summary| async move {
                let id = summary.id?;
                let fetched = api.place_details(&id).await;
                Some((id, fetched))
            })
            .buffered(self.options.detail_concurrency.max(1));

        while let Some(item) = details.next().await {
            let Some((place_id, fetched)) = item else {
                tracing::warn!("skipping nearby result without a place id");
                report.skipped.push(SkippedPlace {
                    place_id: None,
                    reason: SkipReason::MissingId,
                });
                continue;
            };

            let detail = match fetched {
                Ok(detail) => detail,
                Err(err) => {
                    tracing::error!(%place_id, error = %err, "place detail fetch failed; skipping");
                    report.skipped.push(SkippedPlace {
                        place_id: Some(place_id),
                        reason: SkipReason::DetailFetchFailed(err.to_string()),
                    });
                    continue;
                }
            };

            let Some(marker) = self.build_marker(&place_id, &detail) else {
                tracing::warn!(%place_id, "skipping place with missing location");
                report.skipped.push(SkippedPlace {
                    place_id: Some(place_id),
                    reason: SkipReason::MissingLocation,
                });
                continue;
            };

            if self.board.lock().await.add_for(ticket, marker) {
                report.markers_added += 1;
            } else {
                report.skipped.push(SkippedPlace {
                    place_id: Some(place_id),
                    reason: SkipReason::Superseded,
                });
            }
        }

        tracing::info!(
            places_found = report.places_found,
            markers_added = report.markers_added,
            skipped = report.skipped.len(),
            "dog park search complete"
        );
        Ok(report)
    }

    /// Marker and popup for a detail response; `None` without a location.
    fn build_marker(&self, place_id: &str, detail: &PlaceDetail) -> Option<MarkerEntry> {
        let location = detail.location?;
        let photo_url = detail
            .photos
            .first()
            .map(|photo| self.api.photo_url(&photo.name, self.options.photo_max_px));
        let popup_html = render_popup(detail, photo_url.as_deref(), self.options.photo_max_px);
        let average = (!detail.reviews.is_empty()).then(|| average_rating(&detail.ratings()));

        Some(MarkerEntry {
            place_id: detail.id.clone().unwrap_or_else(|| place_id.to_string()),
            location: location.into(),
            title: detail
                .name()
                .unwrap_or(crate::popup::FALLBACK_NAME)
                .to_string(),
            popup_html,
            average_rating: average,
            review_count: detail.reviews.len(),
        })
    }
}
