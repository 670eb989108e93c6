pub mod handlers;

pub use handlers::{commit, commit_csv, health_check, preview, review};

use crate::service::ReconcileService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 对账路由
pub fn router(service: Arc<ReconcileService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/reconcile/review", post(review))
        .route("/api/reconcile/preview", post(preview))
        .route("/api/reconcile/commit", post(commit))
        .route("/api/reconcile/commit/csv", post(commit_csv))
        .with_state(service)
}
