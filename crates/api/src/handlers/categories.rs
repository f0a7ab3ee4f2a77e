//! Handlers for the `/categories` resource.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use marquee_core::error::CoreError;
use marquee_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::forms::{CategoryForm, FormData};
use crate::response::{DataResponse, OutcomeResponse};
use crate::state::AppState;

/// GET /api/v1/categories
///
/// Every category with its movie count.
pub async fn list_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = state.categories.get_all().await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/categories/{id}
///
/// The category with the movies filed under it.
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = state
        .categories
        .get_with_movies(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    Ok(Json(DataResponse { data: category }))
}

/// POST /api/v1/categories
pub async fn create_category(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = CategoryForm::read(FormData::from_multipart(multipart).await?)?;
    let outcome = state.categories.create(form.into()).await?;
    Ok((StatusCode::CREATED, Json(OutcomeResponse::from(outcome))))
}

/// PUT /api/v1/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = CategoryForm::read(FormData::from_multipart(multipart).await?)?;
    let outcome = state.categories.update(id, form.into()).await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

/// DELETE /api/v1/categories/{id}
///
/// Returns 409 while any movie is filed under the category.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.categories.delete(id).await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}
