//! Read-only aggregate rows for the dashboard and analytics pages.

use marquee_core::price::Price;
use marquee_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

use crate::models::movie::Movie;
use crate::models::status::MovieStatus;

/// Row counts across the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CatalogTotals {
    pub movies: i64,
    pub coming_soon: i64,
    pub now_showing: i64,
    pub ended: i64,
    pub actors: i64,
    pub cinemas: i64,
    pub categories: i64,
}

/// Sum, rounded mean and extremes of movie prices. All zero for an empty
/// catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct PriceStats {
    #[sqlx(try_from = "i64")]
    pub total: Price,
    #[sqlx(try_from = "i64")]
    pub average: Price,
    #[sqlx(try_from = "i64")]
    pub highest: Price,
    #[sqlx(try_from = "i64")]
    pub lowest: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct StatusCount {
    #[sqlx(try_from = "i16")]
    pub status: MovieStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CategoryMovieCount {
    pub category_id: DbId,
    pub name: String,
    pub movie_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CinemaMovieCount {
    pub cinema_id: DbId,
    pub name: String,
    pub movie_count: i64,
    #[sqlx(try_from = "i64")]
    pub price_total: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ActorMovieCount {
    pub actor_id: DbId,
    pub name: String,
    pub profile_picture: Option<String>,
    pub movie_count: i64,
}

/// Landing-page summary.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub totals: CatalogTotals,
    pub movies_by_category: Vec<CategoryMovieCount>,
    /// Newest first.
    pub recent_movies: Vec<Movie>,
    /// Coming-soon movies by release date, earliest first.
    pub upcoming_movies: Vec<Movie>,
}

/// Full analytics report.
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub totals: CatalogTotals,
    pub prices: PriceStats,
    pub movies_by_status: Vec<StatusCount>,
    pub movies_by_category: Vec<CategoryMovieCount>,
    pub movies_by_cinema: Vec<CinemaMovieCount>,
    pub top_movies_by_price: Vec<Movie>,
    pub top_actors: Vec<ActorMovieCount>,
}
