use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use leadscan_core::TargetsUpdate;
use serde::{Deserialize, Serialize};

use super::{map_control_error, map_json_rejection, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;
use crate::scheduler::SchedulerStatus;

const DEFAULT_INTERVAL_MINUTES: i64 = 10;

#[derive(Debug, Serialize)]
pub(super) struct ControlReply {
    success: bool,
    message: String,
    status: SchedulerStatus,
}

#[derive(Debug, Deserialize)]
pub(super) struct IntervalRequest {
    #[serde(default = "default_interval")]
    minutes: i64,
}

fn default_interval() -> i64 {
    DEFAULT_INTERVAL_MINUTES
}

async fn reply(state: &AppState, message: impl Into<String>) -> ControlReply {
    ControlReply {
        success: true,
        message: message.into(),
        status: state.orchestrator.status().await,
    }
}

/// `POST /api/v1/scheduler/start`. An optional targets body is applied
/// before the scheduler starts; an invalid one aborts the start.
pub(super) async fn start(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ApiResponse<ControlReply>>, ApiError> {
    if !body.iter().all(u8::is_ascii_whitespace) {
        let update: TargetsUpdate = serde_json::from_slice(&body).map_err(|e| {
            ApiError::new(req_id.0.clone(), "validation_error", format!("invalid body: {e}"))
        })?;
        if !update.is_empty() {
            state
                .orchestrator
                .set_config(&update)
                .await
                .map_err(|e| map_control_error(req_id.0.clone(), &e))?;
        }
    }

    let started = state
        .orchestrator
        .start()
        .await
        .map_err(|e| map_control_error(req_id.0.clone(), &e))?;
    let message = if started {
        "scheduler started"
    } else {
        "scheduler already running"
    };
    Ok(ApiResponse::new(req_id.0, reply(&state, message).await))
}

pub(super) async fn stop(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ControlReply>>, ApiError> {
    let stopped = state
        .orchestrator
        .stop()
        .await
        .map_err(|e| map_control_error(req_id.0.clone(), &e))?;
    let message = if stopped {
        "scheduler stopped"
    } else {
        "scheduler was not running"
    };
    Ok(ApiResponse::new(req_id.0, reply(&state, message).await))
}

pub(super) async fn status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ControlReply>> {
    let status = state.orchestrator.status().await;
    let message = if status.running {
        "scheduler running"
    } else {
        "scheduler stopped"
    };
    ApiResponse::new(
        req_id.0,
        ControlReply {
            success: true,
            message: message.to_owned(),
            status,
        },
    )
}

pub(super) async fn set_interval(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<IntervalRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ControlReply>>, ApiError> {
    let Json(request) = payload.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;
    state
        .orchestrator
        .set_interval(request.minutes)
        .await
        .map_err(|e| map_control_error(req_id.0.clone(), &e))?;
    let message = format!("scan interval set to {} minutes", request.minutes);
    Ok(ApiResponse::new(req_id.0, reply(&state, message).await))
}

pub(super) async fn set_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<TargetsUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<ControlReply>>, ApiError> {
    let Json(update) = payload.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;
    state
        .orchestrator
        .set_config(&update)
        .await
        .map_err(|e| map_control_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(
        req_id.0,
        reply(&state, "scan targets updated").await,
    ))
}
