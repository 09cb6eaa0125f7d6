//! `search` command handlers.
//!
//! Each invocation builds a fresh pipeline, runs one search, and prints the
//! markers left on the board afterwards.

use clap::Subcommand;
use dogpark_core::{AppConfig, LatLng, RegionRegistry, ViewportBounds};
use dogpark_places::{MarkerBoard, PipelineOptions, PlacesClient, SearchError, SearchPipeline};

use crate::output::{print_search, SearchOutput};

/// Sub-commands available under `search`.
#[derive(Debug, Subcommand)]
pub enum SearchCommands {
    /// Search around a region's center (see `regions`)
    Region {
        /// Region identifier, e.g. `stockholm`
        identifier: String,
    },
    /// Search the area between two corners
    Viewport {
        /// North-east corner as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        ne: LatLng,
        /// South-west corner as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        sw: LatLng,
    },
}

/// Run one search and print its markers.
///
/// # Errors
///
/// Returns an error if the API key is missing, the region is unknown, the
/// corners do not form valid bounds, or the nearby search fails.
pub(crate) async fn run_search(
    config: &AppConfig,
    registry: &RegionRegistry,
    command: SearchCommands,
    json: bool,
) -> anyhow::Result<()> {
    let client = PlacesClient::with_base_url(
        config.require_places_api_key()?,
        config.request_timeout_secs,
        &config.user_agent,
        &config.places_base_url,
    )?;
    let pipeline = SearchPipeline::new(
        client,
        MarkerBoard::shared(),
        PipelineOptions::from_app_config(config),
    );

    let (region, report) = match command {
        SearchCommands::Region { identifier } => {
            let outcome = pipeline
                .search_region(registry, &identifier)
                .await
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "unknown region '{identifier}'; run `regions` to list identifiers"
                    )
                })?;
            (Some(outcome.region), outcome.result.map_err(search_failed)?)
        }
        SearchCommands::Viewport { ne, sw } => {
            let bounds = ViewportBounds::new(ne, sw)?;
            let report = pipeline
                .search_viewport(&bounds)
                .await
                .map_err(search_failed)?;
            (None, report)
        }
    };

    let markers = pipeline.board().lock().await.markers().to_vec();
    print_search(
        &SearchOutput {
            region,
            notice: report.notice(),
            report,
            markers,
        },
        json,
    )
}

fn search_failed(err: SearchError) -> anyhow::Error {
    tracing::error!(error = %err, "dog park search failed");
    anyhow::anyhow!(err.user_message())
}
