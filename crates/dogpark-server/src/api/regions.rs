use axum::{extract::State, Extension, Json};
use dogpark_core::Region;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

pub(super) async fn list_regions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<Region>>> {
    ApiResponse::json(req_id.0, state.registry.regions().to_vec())
}
