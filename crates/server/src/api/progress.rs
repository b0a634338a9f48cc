//! Progress and routing endpoints.
//!
//! Every request fetches a fresh profile; nothing is cached between calls.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use loanport_core::progress::{resolve_next_route, ProgressReport, Route};

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct NextRouteResponse {
    pub route: Route,
}

/// `GET /borrowers/{id}/progress`
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(borrower_id): Path<String>,
) -> Result<Json<ProgressReport>, ApiError> {
    let profile = state.backend().fetch_profile(&borrower_id).await?;
    let report = ProgressReport::from_profile(&profile);
    debug!(
        borrower_id = %borrower_id,
        current_stage = report.current_stage,
        "Progress derived"
    );
    Ok(Json(report))
}

/// `GET /borrowers/{id}/next-route`
pub async fn get_next_route(
    State(state): State<Arc<AppState>>,
    Path(borrower_id): Path<String>,
) -> Result<Json<NextRouteResponse>, ApiError> {
    let profile = state.backend().fetch_profile(&borrower_id).await?;
    Ok(Json(NextRouteResponse {
        route: resolve_next_route(&profile),
    }))
}
