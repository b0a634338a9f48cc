use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{borrowers, documents, handlers, middleware::metrics_middleware, progress};
use crate::state::AppState;

/// Files one document form may carry, used to size the request body limit.
const MAX_FILES_PER_REQUEST: u64 = 10;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config()
        .uploads
        .max_file_bytes
        .saturating_mul(MAX_FILES_PER_REQUEST)
        .min(usize::MAX as u64) as usize;

    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Progress engine
        .route("/borrowers/{id}/progress", get(progress::get_progress))
        .route("/borrowers/{id}/next-route", get(progress::get_next_route))
        // Document ingestion
        .route(
            "/borrowers/{id}/documents",
            post(documents::submit_documents).layer(DefaultBodyLimit::max(body_limit)),
        )
        // Borrower forms
        .route("/borrowers/{id}/employment", put(borrowers::update_employment))
        .route("/borrowers/{id}/bank-detail", put(borrowers::update_bank_detail))
        .route("/loan-applications/{id}", get(borrowers::get_loan_application))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
