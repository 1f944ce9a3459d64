// Router assembly
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    append_usage, health_check, list_model_rows, list_models, list_usage, model_analytics, overview,
    register_models,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/models", get(list_models).post(register_models))
        .route("/usage", get(list_usage).post(append_usage))
        .route("/dashboard/overview", get(overview))
        .route("/dashboard/analytics/:model_id", get(model_analytics))
        .route("/dashboard/models", get(list_model_rows))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
