// HTTP request handlers
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::domain::drum::DrumState;
use crate::domain::machine::{CanonicalStatus, MachineView};
use crate::presentation::app_state::AppState;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current view of all monitored machines. Also reconciles the drum
/// animations so loops exist exactly for the machines that are running.
pub async fn list_machines(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.status_service.snapshot().await;
    state.drums.sync(&snapshot.machines).await;
    Json(snapshot)
}

#[derive(Debug, Serialize)]
pub struct MachineDetail {
    #[serde(flatten)]
    pub view: MachineView,
    /// Present only while the machine is running.
    pub drum: Option<DrumState>,
}

/// Detail view for one machine, selected by id.
pub async fn get_machine(
    Path(machine_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.status_service.machine(&machine_id).await {
        Some(view) => {
            state.drums.ensure(&view).await;
            let drum = if view.status == CanonicalStatus::InUse {
                state.drums.snapshot(&view.machine_id).await
            } else {
                None
            };
            Json(MachineDetail { view, drum }).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Manual refresh action. Fires an out-of-band fetch and returns immediately;
/// the next poll of /machines sees the result once it lands.
pub async fn refresh(State(state): State<Arc<AppState>>) -> StatusCode {
    let _ = state.status_service.refresh_now();
    StatusCode::ACCEPTED
}
