//! Shared domain types for the dog park finder: the county registry,
//! viewport geometry, the rating renderer, and environment configuration.

mod app_config;
mod config;
pub mod geo;
pub mod rating;
pub mod regions;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{
    viewport_search_area, BoundsError, LatLng, SearchArea, ViewportBounds, EARTH_RADIUS_METERS,
};
pub use rating::{average_rating, render_stars, star_glyphs, StarGlyph, STAR_COUNT};
pub use regions::{load_regions, Region, RegionRegistry};

/// Upper bound the Places API accepts for a circular location restriction.
pub const MAX_SEARCH_RADIUS_METERS: f64 = 50_000.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read regions file {path}: {source}")]
    RegionsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse regions file: {0}")]
    RegionsFileParse(#[from] serde_yaml::Error),

    #[error("invalid regions file: {0}")]
    Validation(String),
}
