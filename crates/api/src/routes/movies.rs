//! Route definitions for the `/movies` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::movies;
use crate::state::AppState;

/// Routes mounted at `/movies`.
///
/// ```text
/// GET    /                     -> list_movies
/// POST   /                     -> create_movie
/// GET    /{id}                 -> get_movie
/// PUT    /{id}                 -> update_movie
/// DELETE /{id}                 -> delete_movie
/// DELETE /gallery/{image_id}   -> delete_gallery_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(movies::list_movies).post(movies::create_movie))
        .route(
            "/{id}",
            get(movies::get_movie)
                .put(movies::update_movie)
                .delete(movies::delete_movie),
        )
        .route("/gallery/{image_id}", delete(movies::delete_gallery_image))
}
