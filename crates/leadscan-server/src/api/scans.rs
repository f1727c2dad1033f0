use axum::{
    extract::{Query, State},
    Extension, Json,
};
use leadscan_core::ScanResult;
use serde::Deserialize;

use super::{map_control_error, normalize_limit, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct ScanListQuery {
    limit: Option<i64>,
}

/// `GET /api/v1/scans`: scan log entries, newest first.
pub(super) async fn list_scans(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ScanListQuery>,
) -> Json<ApiResponse<Vec<ScanResult>>> {
    let limit = normalize_limit(query.limit);
    ApiResponse::new(req_id.0, state.orchestrator.history(limit).await)
}

/// `POST /api/v1/scans`: run one scan now. Conflicts with a scan in flight.
pub(super) async fn trigger_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ScanResult>>, ApiError> {
    let result = state
        .orchestrator
        .scan_now()
        .await
        .map_err(|e| map_control_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(req_id.0, result))
}
