use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use dogpark_core::{Region, ViewportBounds};
use dogpark_places::{MapView, MarkerEntry, SearchReport};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_search_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct SearchData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<MapView>,
    pub notice: Option<&'static str>,
    pub report: SearchReport,
    pub markers: Vec<MarkerEntry>,
}

impl SearchData {
    async fn collect(state: &AppState, report: SearchReport) -> Self {
        let markers = state.pipeline.board().lock().await.markers().to_vec();
        Self {
            region: None,
            view: None,
            notice: report.notice(),
            report,
            markers,
        }
    }
}

/// Runs a search on its own task. Dropping the request (client hang-up) must
/// not stop a search half-way, since the board was already cleared for it.
async fn run_to_completion<T>(
    req_id: &str,
    search: impl Future<Output = T> + Send + 'static,
) -> Result<T, ApiError>
where
    T: Send + 'static,
{
    tokio::spawn(search).await.map_err(|e| {
        tracing::error!(error = %e, "search task did not complete");
        ApiError::new(req_id, "internal_error", "search task did not complete")
    })
}

pub(super) async fn search_region(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(identifier): Path<String>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let pipeline = Arc::clone(&state.pipeline);
    let registry = Arc::clone(&state.registry);
    let lookup = identifier.clone();
    let outcome = run_to_completion(&req_id.0, async move {
        pipeline.search_region(&registry, &lookup).await
    })
    .await?;
    let Some(outcome) = outcome else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("unknown region: {identifier}"),
        ));
    };

    let report = outcome
        .result
        .map_err(|e| map_search_error(req_id.0.clone(), &e))?;
    let data = SearchData {
        region: Some(outcome.region),
        view: Some(outcome.view),
        ..SearchData::collect(&state, report).await
    };
    Ok(ApiResponse::json(req_id.0, data))
}

pub(super) async fn search_viewport(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(bounds): Json<ViewportBounds>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let pipeline = Arc::clone(&state.pipeline);
    let report = run_to_completion(&req_id.0, async move {
        pipeline.search_viewport(&bounds).await
    })
    .await?
    .map_err(|e| map_search_error(req_id.0.clone(), &e))?;
    let data = SearchData::collect(&state, report).await;
    Ok(ApiResponse::json(req_id.0, data))
}

/// Fills the board with one region search at startup. Failures are logged;
/// the server keeps running with an empty board.
pub(crate) async fn seed_board(state: AppState, identifier: String) {
    match state
        .pipeline
        .search_region(&state.registry, &identifier)
        .await
    {
        None => tracing::warn!(%identifier, "initial region is not in the registry"),
        Some(outcome) => match outcome.result {
            Ok(report) => tracing::info!(
                %identifier,
                markers = report.markers_added,
                "initial region search finished"
            ),
            Err(e) => tracing::error!(%identifier, error = %e, "initial region search failed"),
        },
    }
}
