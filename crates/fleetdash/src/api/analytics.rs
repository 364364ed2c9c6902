use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::{ApiError, AppState};
use crate::analytics::{dashboard, Dashboard};

pub(super) fn routes() -> Router<AppState> {
    Router::new().route("/analytics/dashboard", get(get_dashboard))
}

async fn get_dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, ApiError> {
    let limit = state.config().analytics.recent_activity_limit;
    state
        .with_storage(|storage| dashboard(storage, limit))
        .map(Json)
        .map_err(|err| ApiError::internal("Failed to fetch analytics", &err))
}
