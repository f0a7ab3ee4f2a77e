//! Aggregate queries behind the dashboard and analytics pages.

use crate::models::analytics::{
    ActorMovieCount, Analytics, CatalogTotals, CategoryMovieCount, CinemaMovieCount, Dashboard,
    PriceStats, StatusCount,
};
use crate::models::movie::Movie;
use crate::models::status::MovieStatus;
use crate::DbPool;

/// Column list shared across movie queries.
const MOVIE_COLUMNS: &str = "id, name, description, price, status, release_date_time, \
     duration_minutes, main_image, category_id, cinema_id";

const RECENT_MOVIES_LIMIT: i64 = 8;
const UPCOMING_MOVIES_LIMIT: i64 = 5;
const TOP_MOVIES_LIMIT: i64 = 10;
const TOP_ACTORS_LIMIT: i64 = 10;

/// Read-only reporting queries.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Totals, movies per category, the newest movies and the next releases.
    pub async fn dashboard(pool: &DbPool) -> Result<Dashboard, sqlx::Error> {
        Ok(Dashboard {
            totals: Self::totals(pool).await?,
            movies_by_category: Self::movies_by_category(pool).await?,
            recent_movies: Self::recent_movies(pool, RECENT_MOVIES_LIMIT).await?,
            upcoming_movies: Self::upcoming_movies(pool, UPCOMING_MOVIES_LIMIT).await?,
        })
    }

    /// The full analytics report.
    pub async fn analytics(pool: &DbPool) -> Result<Analytics, sqlx::Error> {
        Ok(Analytics {
            totals: Self::totals(pool).await?,
            prices: Self::price_stats(pool).await?,
            movies_by_status: Self::movies_by_status(pool).await?,
            movies_by_category: Self::movies_by_category(pool).await?,
            movies_by_cinema: Self::movies_by_cinema(pool).await?,
            top_movies_by_price: Self::top_movies_by_price(pool, TOP_MOVIES_LIMIT).await?,
            top_actors: Self::top_actors(pool, TOP_ACTORS_LIMIT).await?,
        })
    }

    pub async fn totals(pool: &DbPool) -> Result<CatalogTotals, sqlx::Error> {
        sqlx::query_as::<_, CatalogTotals>(
            "SELECT
                (SELECT COUNT(*) FROM movies) AS movies,
                (SELECT COUNT(*) FROM movies WHERE status = ?) AS coming_soon,
                (SELECT COUNT(*) FROM movies WHERE status = ?) AS now_showing,
                (SELECT COUNT(*) FROM movies WHERE status = ?) AS ended,
                (SELECT COUNT(*) FROM actors) AS actors,
                (SELECT COUNT(*) FROM cinemas) AS cinemas,
                (SELECT COUNT(*) FROM categories) AS categories",
        )
        .bind(MovieStatus::ComingSoon.id())
        .bind(MovieStatus::NowShowing.id())
        .bind(MovieStatus::Ended.id())
        .fetch_one(pool)
        .await
    }

    /// Sum, rounded average, maximum and minimum price in cents.
    pub async fn price_stats(pool: &DbPool) -> Result<PriceStats, sqlx::Error> {
        sqlx::query_as::<_, PriceStats>(
            "SELECT
                COALESCE(SUM(price), 0) AS total,
                CAST(COALESCE(ROUND(AVG(price)), 0) AS INTEGER) AS average,
                COALESCE(MAX(price), 0) AS highest,
                COALESCE(MIN(price), 0) AS lowest
             FROM movies",
        )
        .fetch_one(pool)
        .await
    }

    /// Only statuses that have at least one movie appear.
    pub async fn movies_by_status(pool: &DbPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM movies GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }

    /// Every category, busiest first.
    pub async fn movies_by_category(
        pool: &DbPool,
    ) -> Result<Vec<CategoryMovieCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryMovieCount>(
            "SELECT c.id AS category_id, c.name, COUNT(m.id) AS movie_count
             FROM categories c
             LEFT JOIN movies m ON m.category_id = c.id
             GROUP BY c.id, c.name
             ORDER BY movie_count DESC, c.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Every cinema with its movie count and summed prices, busiest first.
    pub async fn movies_by_cinema(pool: &DbPool) -> Result<Vec<CinemaMovieCount>, sqlx::Error> {
        sqlx::query_as::<_, CinemaMovieCount>(
            "SELECT ci.id AS cinema_id, ci.name, COUNT(m.id) AS movie_count,
                    COALESCE(SUM(m.price), 0) AS price_total
             FROM cinemas ci
             LEFT JOIN movies m ON m.cinema_id = ci.id
             GROUP BY ci.id, ci.name
             ORDER BY movie_count DESC, ci.id",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn recent_movies(pool: &DbPool, limit: i64) -> Result<Vec<Movie>, sqlx::Error> {
        let query = format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY id DESC LIMIT ?");
        sqlx::query_as::<_, Movie>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn upcoming_movies(pool: &DbPool, limit: i64) -> Result<Vec<Movie>, sqlx::Error> {
        let query = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies
             WHERE status = ?
             ORDER BY release_date_time, id
             LIMIT ?"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(MovieStatus::ComingSoon.id())
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn top_movies_by_price(
        pool: &DbPool,
        limit: i64,
    ) -> Result<Vec<Movie>, sqlx::Error> {
        let query = format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY price DESC, id LIMIT ?");
        sqlx::query_as::<_, Movie>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Actors ordered by how many movies they appear in. Ties keep id order.
    pub async fn top_actors(
        pool: &DbPool,
        limit: i64,
    ) -> Result<Vec<ActorMovieCount>, sqlx::Error> {
        sqlx::query_as::<_, ActorMovieCount>(
            "SELECT a.id AS actor_id, a.name, a.profile_picture, COUNT(cl.movie_id) AS movie_count
             FROM actors a
             LEFT JOIN cast_links cl ON cl.actor_id = a.id
             GROUP BY a.id, a.name, a.profile_picture
             ORDER BY movie_count DESC, a.id
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
