//! Handlers for the `/cinemas` resource.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use marquee_core::error::CoreError;
use marquee_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::forms::{CinemaForm, FormData};
use crate::response::{DataResponse, OutcomeResponse};
use crate::state::AppState;

/// GET /api/v1/cinemas
///
/// Every cinema with its movie count.
pub async fn list_cinemas(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let cinemas = state.cinemas.get_all().await?;
    Ok(Json(DataResponse { data: cinemas }))
}

/// GET /api/v1/cinemas/{id}
///
/// The cinema with the movies shown there.
pub async fn get_cinema(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let cinema = state
        .cinemas
        .get_with_movies(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Cinema",
            id,
        }))?;
    Ok(Json(DataResponse { data: cinema }))
}

/// POST /api/v1/cinemas
pub async fn create_cinema(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = CinemaForm::read(FormData::from_multipart(multipart).await?)?;
    let outcome = state.cinemas.create(form.into()).await?;
    Ok((StatusCode::CREATED, Json(OutcomeResponse::from(outcome))))
}

/// PUT /api/v1/cinemas/{id}
pub async fn update_cinema(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = CinemaForm::read(FormData::from_multipart(multipart).await?)?;
    let outcome = state.cinemas.update(id, form.into()).await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

/// DELETE /api/v1/cinemas/{id}
///
/// Returns 409 while any movie is shown at the cinema.
pub async fn delete_cinema(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.cinemas.delete(id).await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}
