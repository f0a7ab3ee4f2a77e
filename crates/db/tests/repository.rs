//! Integration tests for repository reads, composite keys, cascades and
//! the reporting queries.

use assert_matches::assert_matches;
use chrono::{NaiveDate, TimeZone, Utc};
use marquee_core::price::Price;
use marquee_db::entity::UNSAVED_ID;
use marquee_db::models::actor::Actor;
use marquee_db::models::cast_link::CastLink;
use marquee_db::models::category::Category;
use marquee_db::models::cinema::Cinema;
use marquee_db::models::gallery_image::GalleryImage;
use marquee_db::models::movie::Movie;
use marquee_db::models::status::MovieStatus;
use marquee_db::repositories::AnalyticsRepo;
use marquee_db::{DbError, UnitOfWork};
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Seeded {
    category_id: i64,
    cinema_id: i64,
    actor_ids: Vec<i64>,
}

fn actor(name: &str) -> Actor {
    Actor {
        id: UNSAVED_ID,
        name: name.to_string(),
        profile_picture: None,
        bio: None,
        date_of_birth: NaiveDate::from_ymd_opt(1980, 5, 17),
    }
}

fn movie(name: &str, seeded: &Seeded, cents: i64, status: MovieStatus, day: u32) -> Movie {
    Movie {
        id: UNSAVED_ID,
        name: name.to_string(),
        description: format!("{name} description"),
        price: Price::from_cents(cents).unwrap(),
        status,
        release_date_time: Utc.with_ymd_and_hms(2025, 11, day, 18, 30, 0).unwrap(),
        duration_minutes: None,
        main_image: None,
        category_id: seeded.category_id,
        cinema_id: seeded.cinema_id,
    }
}

async fn seed(pool: &SqlitePool) -> Seeded {
    let uow = UnitOfWork::new(pool.clone());
    let category = uow
        .categories()
        .unwrap()
        .add(Category {
            id: UNSAVED_ID,
            name: "Sci-Fi".into(),
            image_url: None,
        })
        .unwrap();
    let cinema = uow
        .cinemas()
        .unwrap()
        .add(Cinema {
            id: UNSAVED_ID,
            name: "Grand".into(),
            logo: None,
            description: Some("Downtown".into()),
            address: None,
        })
        .unwrap();
    let actors = uow
        .actors()
        .unwrap()
        .add_range(["Ada", "Ben", "Cy"].map(actor))
        .unwrap();
    uow.save_changes().await.unwrap();
    uow.dispose().await;

    Seeded {
        category_id: category.id().unwrap(),
        cinema_id: cinema.id().unwrap(),
        actor_ids: actors.iter().map(|a| a.id().unwrap()).collect(),
    }
}

async fn insert_movie(pool: &SqlitePool, movie: Movie) -> Movie {
    let uow = UnitOfWork::new(pool.clone());
    let staged = uow.movies().unwrap().add(movie).unwrap();
    uow.save_changes().await.unwrap();
    staged.persisted().cloned().unwrap()
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn persisted_row_round_trips_every_column(pool: SqlitePool) {
    let seeded = seed(&pool).await;
    let mut input = movie("Dune", &seeded, 1250, MovieStatus::ComingSoon, 3);
    input.duration_minutes = Some(155);
    input.main_image = Some("uploads/movies/x_dune.png".into());

    let stored = insert_movie(&pool, input.clone()).await;
    assert_ne!(stored.id, UNSAVED_ID);
    assert_eq!(Movie { id: stored.id, ..input }, stored);

    let uow = UnitOfWork::new(pool);
    let loaded = uow.movies().unwrap().get_by_id(stored.id).await.unwrap();
    assert_eq!(loaded, Some(stored));

    let actors = uow.actors().unwrap().get_all().await.unwrap();
    assert_eq!(actors[0].date_of_birth, NaiveDate::from_ymd_opt(1980, 5, 17));
}

#[sqlx::test(migrations = "./migrations")]
async fn get_by_id_of_missing_row_is_none(pool: SqlitePool) {
    let uow = UnitOfWork::new(pool);
    assert!(uow.movies().unwrap().get_by_id(12345).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn find_count_and_any_apply_predicate(pool: SqlitePool) {
    let seeded = seed(&pool).await;
    insert_movie(&pool, movie("Alpha", &seeded, 500, MovieStatus::NowShowing, 1)).await;
    insert_movie(&pool, movie("Beta", &seeded, 700, MovieStatus::Ended, 2)).await;
    insert_movie(&pool, movie("Gamma", &seeded, 900, MovieStatus::NowShowing, 4)).await;

    let uow = UnitOfWork::new(pool);
    let movies = uow.movies().unwrap();
    let showing = movies
        .find(|m| m.status == MovieStatus::NowShowing)
        .await
        .unwrap();
    assert_eq!(
        showing.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        vec!["Alpha", "Gamma"]
    );
    assert_eq!(movies.count().await.unwrap(), 3);
    assert_eq!(
        movies.count().await.unwrap(),
        movies.count_where(|_| true).await.unwrap()
    );
    assert_eq!(
        movies.count_where(|m| m.price.cents() > 600).await.unwrap(),
        2
    );
    assert!(movies.any(|m| m.name == "Beta").await.unwrap());
    assert!(!movies.any(|m| m.name == "Delta").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn single_or_default_rejects_multiple_matches(pool: SqlitePool) {
    let seeded = seed(&pool).await;
    let uow = UnitOfWork::new(pool);
    let actors = uow.actors().unwrap();

    let ben = actors.single_or_default(|a| a.name == "Ben").await.unwrap();
    assert_eq!(ben.map(|a| a.id), Some(seeded.actor_ids[1]));
    assert!(actors
        .single_or_default(|a| a.name == "Zed")
        .await
        .unwrap()
        .is_none());
    assert_matches!(
        actors.single_or_default(|a| a.bio.is_none()).await,
        Err(DbError::AmbiguousResult { entity: "Actor", count: 3 })
    );
}

// ---------------------------------------------------------------------------
// Composite keys and cascades
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_cast_link_is_a_constraint_violation(pool: SqlitePool) {
    let seeded = seed(&pool).await;
    let stored = insert_movie(&pool, movie("Solo", &seeded, 100, MovieStatus::Ended, 5)).await;

    let uow = UnitOfWork::new(pool);
    let link = CastLink {
        movie_id: stored.id,
        actor_id: seeded.actor_ids[0],
    };
    let links = uow.cast_links().unwrap();
    links.add(link).unwrap();
    links.add(link).unwrap();

    let err = uow.save_changes().await.unwrap_err();
    assert!(err.is_constraint_violation(), "unexpected error: {err}");
    assert_eq!(links.count().await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_movie_cascades_to_owned_rows(pool: SqlitePool) {
    let seeded = seed(&pool).await;
    let stored = insert_movie(&pool, movie("Heat", &seeded, 100, MovieStatus::Ended, 6)).await;

    let uow = UnitOfWork::new(pool.clone());
    uow.cast_links()
        .unwrap()
        .add_range(seeded.actor_ids.iter().map(|&actor_id| CastLink {
            movie_id: stored.id,
            actor_id,
        }))
        .unwrap();
    let images = uow
        .gallery_images()
        .unwrap()
        .add_range(["uploads/movies/gallery/a.png", "uploads/movies/gallery/b.png"]
            .map(|url| GalleryImage::new(stored.id, url)))
        .unwrap();
    uow.save_changes().await.unwrap();

    // Display order is insertion order.
    let ids: Vec<_> = images.iter().map(|i| i.id().unwrap()).collect();
    assert!(ids[0] < ids[1]);

    uow.movies().unwrap().delete(&stored).unwrap();
    uow.save_changes().await.unwrap();

    assert_eq!(uow.cast_links().unwrap().count().await.unwrap(), 0);
    assert_eq!(uow.gallery_images().unwrap().count().await.unwrap(), 0);
    assert_eq!(uow.actors().unwrap().count().await.unwrap(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn referenced_category_is_protected_by_the_store(pool: SqlitePool) {
    let seeded = seed(&pool).await;
    insert_movie(&pool, movie("Jaws", &seeded, 100, MovieStatus::Ended, 7)).await;

    let uow = UnitOfWork::new(pool);
    let category = uow
        .categories()
        .unwrap()
        .get_by_id(seeded.category_id)
        .await
        .unwrap()
        .unwrap();
    uow.categories().unwrap().delete(&category).unwrap();

    let err = uow.save_changes().await.unwrap_err();
    assert!(err.is_constraint_violation(), "unexpected error: {err}");
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_range_removes_every_row(pool: SqlitePool) {
    let seeded = seed(&pool).await;
    let uow = UnitOfWork::new(pool);
    let actors = uow.actors().unwrap();
    let all = actors.get_all().await.unwrap();
    assert_eq!(all.len(), seeded.actor_ids.len());

    actors.delete_range(&all).unwrap();
    assert_eq!(uow.save_changes().await.unwrap(), 3);
    assert_eq!(actors.count().await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn dashboard_summarises_catalog(pool: SqlitePool) {
    let seeded = seed(&pool).await;
    let later = insert_movie(&pool, movie("Later", &seeded, 800, MovieStatus::ComingSoon, 20)).await;
    let sooner = insert_movie(&pool, movie("Sooner", &seeded, 600, MovieStatus::ComingSoon, 10)).await;
    let showing = insert_movie(&pool, movie("Now", &seeded, 1000, MovieStatus::NowShowing, 1)).await;

    let dashboard = AnalyticsRepo::dashboard(&pool).await.unwrap();
    assert_eq!(dashboard.totals.movies, 3);
    assert_eq!(dashboard.totals.coming_soon, 2);
    assert_eq!(dashboard.totals.now_showing, 1);
    assert_eq!(dashboard.totals.ended, 0);
    assert_eq!(dashboard.totals.actors, 3);
    assert_eq!(
        dashboard.recent_movies.iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![showing.id, sooner.id, later.id]
    );
    assert_eq!(
        dashboard.upcoming_movies.iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![sooner.id, later.id]
    );
    assert_eq!(dashboard.movies_by_category[0].movie_count, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn analytics_price_stats_and_top_actors(pool: SqlitePool) {
    let empty = AnalyticsRepo::price_stats(&pool).await.unwrap();
    assert_eq!(empty.total, Price::ZERO);

    let seeded = seed(&pool).await;
    let cheap = insert_movie(&pool, movie("Cheap", &seeded, 500, MovieStatus::Ended, 1)).await;
    let dear = insert_movie(&pool, movie("Dear", &seeded, 1001, MovieStatus::NowShowing, 2)).await;

    let uow = UnitOfWork::new(pool.clone());
    uow.cast_links()
        .unwrap()
        .add_range([
            CastLink { movie_id: cheap.id, actor_id: seeded.actor_ids[2] },
            CastLink { movie_id: dear.id, actor_id: seeded.actor_ids[2] },
            CastLink { movie_id: dear.id, actor_id: seeded.actor_ids[0] },
        ])
        .unwrap();
    uow.save_changes().await.unwrap();

    let report = AnalyticsRepo::analytics(&pool).await.unwrap();
    assert_eq!(report.prices.total.cents(), 1501);
    assert_eq!(report.prices.average.cents(), 751);
    assert_eq!(report.prices.highest.cents(), 1001);
    assert_eq!(report.prices.lowest.cents(), 500);
    assert_eq!(report.top_movies_by_price[0].id, dear.id);
    assert_eq!(report.movies_by_cinema[0].price_total.cents(), 1501);
    assert_eq!(report.movies_by_status.len(), 2);

    let top: Vec<_> = report
        .top_actors
        .iter()
        .map(|a| (a.actor_id, a.movie_count))
        .collect();
    assert_eq!(
        top,
        vec![
            (seeded.actor_ids[2], 2),
            (seeded.actor_ids[0], 1),
            (seeded.actor_ids[1], 0),
        ]
    );
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn in_memory_pool_bootstraps() {
    let pool = marquee_db::create_pool("sqlite::memory:").await.unwrap();
    marquee_db::run_migrations(&pool).await.unwrap();
    marquee_db::health_check(&pool).await.unwrap();

    let uow = UnitOfWork::new(pool);
    assert_eq!(uow.movies().unwrap().count().await.unwrap(), 0);
}
