//! Route definitions for the `/cinemas` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::cinemas;
use crate::state::AppState;

/// Routes mounted at `/cinemas`.
///
/// ```text
/// GET    /        -> list_cinemas
/// POST   /        -> create_cinema
/// GET    /{id}    -> get_cinema
/// PUT    /{id}    -> update_cinema
/// DELETE /{id}    -> delete_cinema
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cinemas::list_cinemas).post(cinemas::create_cinema),
        )
        .route(
            "/{id}",
            get(cinemas::get_cinema)
                .put(cinemas::update_cinema)
                .delete(cinemas::delete_cinema),
        )
}
