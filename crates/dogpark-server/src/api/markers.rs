use axum::{
    extract::{Path, State},
    Extension, Json,
};
use dogpark_places::{BoardSnapshot, MarkerEntry};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct MapClickData {
    /// Whether a popup was open before the click.
    pub closed: bool,
}

pub(super) async fn list_markers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<BoardSnapshot>> {
    let snapshot = state.pipeline.board().lock().await.snapshot();
    ApiResponse::json(req_id.0, snapshot)
}

pub(super) async fn clear_markers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<BoardSnapshot>> {
    let snapshot = {
        let mut board = state.pipeline.board().lock().await;
        board.clear_all();
        board.snapshot()
    };
    ApiResponse::json(req_id.0, snapshot)
}

pub(super) async fn select_marker(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(place_id): Path<String>,
) -> Result<Json<ApiResponse<MarkerEntry>>, ApiError> {
    let selected = state.pipeline.board().lock().await.select(&place_id).cloned();
    match selected {
        Some(marker) => Ok(ApiResponse::json(req_id.0, marker)),
        None => Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no marker for place {place_id}"),
        )),
    }
}

pub(super) async fn click_map(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<MapClickData>> {
    let closed = state.pipeline.board().lock().await.click_map();
    ApiResponse::json(req_id.0, MapClickData { closed })
}
