pub mod actors;
pub mod categories;
pub mod cinemas;
pub mod dashboard;
pub mod health;
pub mod movies;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /movies                       list (filters), create
/// /movies/{id}                  get with details, update, delete
/// /movies/gallery/{image_id}    remove one gallery image
///
/// /categories                   list with counts, create
/// /categories/{id}              get with movies, update, delete
/// /cinemas                      list with counts, create
/// /cinemas/{id}                 get with movies, update, delete
/// /actors                       list with counts, create
/// /actors/top                   top actors by movie count
/// /actors/{id}                  get with movies, update, delete
///
/// /dashboard                    landing summary
/// /dashboard/analytics          price and distribution figures
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/movies", movies::router())
        .nest("/categories", categories::router())
        .nest("/cinemas", cinemas::router())
        .nest("/actors", actors::router())
        .nest("/dashboard", dashboard::router())
}
