//! Places API client and the dog park search pipeline built on it.

pub mod client;
pub mod error;
pub mod markers;
pub mod pipeline;
pub mod popup;
pub mod types;

pub use client::{PlacesApi, PlacesClient};
pub use error::PlacesError;
pub use markers::{BoardSnapshot, MarkerBoard, MarkerEntry, SearchTicket, SharedBoard};
pub use pipeline::{
    MapView, PipelineOptions, RegionSearch, SearchError, SearchPipeline, SearchReport,
    SkipReason, SkippedPlace, NO_RESULTS_MESSAGE,
};
pub use popup::render_popup;
pub use types::{PlaceDetail, PlaceSummary, SearchRequest};
