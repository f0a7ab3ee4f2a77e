//! Handlers for the `/movies` resource.
//!
//! Writes take `multipart/form-data` (see [`MovieForm`]).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use marquee_catalog::GalleryImageRemoval;
use marquee_core::error::CoreError;
use marquee_core::types::DbId;
use marquee_db::models::status::MovieStatus;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::forms::{FormData, MovieForm};
use crate::query::MovieFilter;
use crate::response::{DataResponse, OutcomeResponse};
use crate::state::AppState;

/// GET /api/v1/movies
///
/// Newest first. `q`, `category_id`, `cinema_id` and `status` narrow the
/// list and may be combined.
pub async fn list_movies(
    State(state): State<AppState>,
    Query(filter): Query<MovieFilter>,
) -> AppResult<impl IntoResponse> {
    let status = filter
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<MovieStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let term = filter.q.as_deref().filter(|q| !q.trim().is_empty());

    let mut movies = match (term, filter.category_id, filter.cinema_id, status) {
        (Some(term), ..) => state.movies.search(term).await?,
        (None, Some(category_id), ..) => state.movies.get_by_category(category_id).await?,
        (None, None, Some(cinema_id), _) => state.movies.get_by_cinema(cinema_id).await?,
        (None, None, None, Some(status)) => state.movies.get_by_status(status).await?,
        (None, None, None, None) => state.movies.get_all().await?,
    };
    movies.retain(|listing| {
        filter
            .category_id
            .map_or(true, |id| listing.movie.category_id == id)
            && filter
                .cinema_id
                .map_or(true, |id| listing.movie.cinema_id == id)
            && status.map_or(true, |s| listing.movie.status == s)
    });

    Ok(Json(DataResponse { data: movies }))
}

/// GET /api/v1/movies/{id}
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let movie = state
        .movies
        .get_with_details(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Movie", id }))?;
    Ok(Json(DataResponse { data: movie }))
}

/// POST /api/v1/movies
pub async fn create_movie(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = MovieForm::read(FormData::from_multipart(multipart).await?)?;
    let outcome = state.movies.create(form.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(OutcomeResponse::from(outcome))))
}

/// PUT /api/v1/movies/{id}
///
/// Full replace of fields and cast. A `poster` part swaps the poster;
/// `gallery` parts are appended.
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = MovieForm::read(FormData::from_multipart(multipart).await?)?;
    let outcome = state.movies.update(id, form.into_input()?).await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

/// DELETE /api/v1/movies/{id}
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.movies.delete(id).await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

#[derive(Debug, Serialize)]
pub struct GalleryRemovalResponse {
    pub success: bool,
    #[serde(flatten)]
    pub removal: GalleryImageRemoval,
}

/// DELETE /api/v1/movies/gallery/{image_id}
///
/// Always 200; `success` tells whether the image was removed.
pub async fn delete_gallery_image(
    State(state): State<AppState>,
    Path(image_id): Path<DbId>,
) -> Json<GalleryRemovalResponse> {
    let removal = state.movies.delete_gallery_image(image_id).await;
    Json(GalleryRemovalResponse {
        success: removal.is_success(),
        removal,
    })
}
