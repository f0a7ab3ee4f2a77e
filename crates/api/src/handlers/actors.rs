//! Handlers for the `/actors` resource.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use marquee_core::error::CoreError;
use marquee_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::forms::{ActorForm, FormData};
use crate::query::TopParams;
use crate::response::{DataResponse, OutcomeResponse};
use crate::state::AppState;

const DEFAULT_TOP_COUNT: u32 = 10;
const MAX_TOP_COUNT: u32 = 100;

/// GET /api/v1/actors
///
/// Every actor with the number of movies they appear in.
pub async fn list_actors(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let actors = state.actors.get_all().await?;
    Ok(Json(DataResponse { data: actors }))
}

/// GET /api/v1/actors/top?count=
///
/// Actors ranked by movie count. `count` defaults to 10, capped at 100.
pub async fn top_actors(
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> AppResult<impl IntoResponse> {
    let count = params
        .count
        .unwrap_or(DEFAULT_TOP_COUNT)
        .clamp(1, MAX_TOP_COUNT);
    let actors = state.actors.top_by_movie_count(count).await?;
    Ok(Json(DataResponse { data: actors }))
}

/// GET /api/v1/actors/{id}
///
/// The actor with the movies they appear in.
pub async fn get_actor(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let actor = state
        .actors
        .get_with_movies(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Actor", id }))?;
    Ok(Json(DataResponse { data: actor }))
}

/// POST /api/v1/actors
pub async fn create_actor(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = ActorForm::read(FormData::from_multipart(multipart).await?)?;
    let outcome = state.actors.create(form.into()).await?;
    Ok((StatusCode::CREATED, Json(OutcomeResponse::from(outcome))))
}

/// PUT /api/v1/actors/{id}
pub async fn update_actor(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = ActorForm::read(FormData::from_multipart(multipart).await?)?;
    let outcome = state.actors.update(id, form.into()).await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

/// DELETE /api/v1/actors/{id}
///
/// The actor's cast links go with them; the movies stay.
pub async fn delete_actor(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.actors.delete(id).await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}
