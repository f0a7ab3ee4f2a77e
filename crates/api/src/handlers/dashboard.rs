//! Handlers for the `/dashboard` resource.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use marquee_db::repositories::AnalyticsRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard
///
/// Totals, movies per category, the most recent and the upcoming movies.
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let dashboard = AnalyticsRepo::dashboard(&state.pool).await?;
    Ok(Json(DataResponse { data: dashboard }))
}

/// GET /api/v1/dashboard/analytics
pub async fn get_analytics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let analytics = AnalyticsRepo::analytics(&state.pool).await?;
    Ok(Json(DataResponse { data: analytics }))
}
