//! Cinemas: one row and an optional logo each.

use std::sync::Arc;

use marquee_core::error::CoreError;
use marquee_core::storage::{AssetCleanupFailure, BlobStore};
use marquee_core::types::DbId;
use marquee_db::entity::UNSAVED_ID;
use marquee_db::models::cinema::Cinema;
use marquee_db::{DbPool, UnitOfWork};

use crate::rows;
use crate::input::CinemaInput;
use crate::outcome::{CatalogEvent, Outcome};
use crate::views::{CinemaSummary, CinemaWithMovies};

const ENTITY: &str = "Cinema";

pub struct CinemaService<B> {
    pool: DbPool,
    blobs: Arc<B>,
}

impl<B> Clone for CinemaService<B> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            blobs: Arc::clone(&self.blobs),
        }
    }
}

impl<B: BlobStore> CinemaService<B> {
    pub fn new(pool: DbPool, blobs: Arc<B>) -> Self {
        Self { pool, blobs }
    }

    fn unit(&self) -> UnitOfWork {
        UnitOfWork::new(self.pool.clone())
    }

    /// Every cinema with the number of movies it shows.
    pub async fn get_all(&self) -> Result<Vec<CinemaSummary>, CoreError> {
        let uow = self.unit();
        let result = Self::list_in(&uow).await;
        uow.dispose().await;
        result
    }

    pub async fn get_by_id(&self, id: DbId) -> Result<Option<Cinema>, CoreError> {
        let uow = self.unit();
        let result = Self::find_in(&uow, id).await;
        uow.dispose().await;
        result
    }

    pub async fn get_with_movies(&self, id: DbId) -> Result<Option<CinemaWithMovies>, CoreError> {
        let uow = self.unit();
        let result = Self::with_movies_in(&uow, id).await;
        uow.dispose().await;
        result
    }

    pub async fn create(&self, input: CinemaInput) -> Result<Outcome<Cinema>, CoreError> {
        let uow = self.unit();
        let result = rows::create(&uow, self.blobs.as_ref(), input.logo.as_ref(), |logo| {
            input.to_cinema(UNSAVED_ID, logo)
        })
        .await;
        uow.dispose().await;

        let cinema = result?;
        let id = cinema.id;
        tracing::info!(cinema_id = id, "Cinema created");
        Ok(Outcome::new(cinema, CatalogEvent::Created { entity: ENTITY, id }))
    }

    /// Full replace. A new logo supersedes the old one.
    pub async fn update(
        &self,
        id: DbId,
        input: CinemaInput,
    ) -> Result<Outcome<Cinema>, CoreError> {
        let uow = self.unit();
        let mut orphaned = Vec::new();
        let result = rows::update(
            &uow,
            self.blobs.as_ref(),
            id,
            input.logo.as_ref(),
            &mut orphaned,
            |logo| input.to_cinema(id, logo),
        )
        .await;
        uow.dispose().await;

        let cinema = result?;
        tracing::info!(cinema_id = id, "Cinema updated");
        Ok(Outcome::new(cinema, CatalogEvent::Updated { entity: ENTITY, id }).with_orphans(orphaned))
    }

    /// Delete a cinema no movie refers to.
    pub async fn delete(&self, id: DbId) -> Result<Outcome<()>, CoreError> {
        let uow = self.unit();
        let result = self.delete_in(&uow, id).await;
        uow.dispose().await;

        let orphaned = result?;
        tracing::info!(cinema_id = id, "Cinema deleted");
        Ok(Outcome::new((), CatalogEvent::Deleted { entity: ENTITY, id }).with_orphans(orphaned))
    }

    /// Whether no movie refers to the cinema.
    pub async fn can_delete(&self, id: DbId) -> Result<bool, CoreError> {
        let uow = self.unit();
        let result = Self::is_referenced_in(&uow, id).await.map(|referenced| !referenced);
        uow.dispose().await;
        result
    }

    // -- unit-scoped steps --------------------------------------------------

    async fn list_in(uow: &UnitOfWork) -> Result<Vec<CinemaSummary>, CoreError> {
        let cinemas = uow.cinemas()?.get_all().await?;
        let movies = uow.movies()?.get_all().await?;
        Ok(cinemas
            .into_iter()
            .map(|cinema| CinemaSummary {
                movie_count: movies
                    .iter()
                    .filter(|m| m.cinema_id == cinema.id)
                    .count(),
                cinema,
            })
            .collect())
    }

    async fn find_in(uow: &UnitOfWork, id: DbId) -> Result<Option<Cinema>, CoreError> {
        Ok(uow.cinemas()?.get_by_id(id).await?)
    }

    async fn with_movies_in(
        uow: &UnitOfWork,
        id: DbId,
    ) -> Result<Option<CinemaWithMovies>, CoreError> {
        let Some(cinema) = Self::find_in(uow, id).await? else {
            return Ok(None);
        };
        let movies = uow.movies()?.find(|m| m.cinema_id == id).await?;
        Ok(Some(CinemaWithMovies { cinema, movies }))
    }

    async fn is_referenced_in(uow: &UnitOfWork, id: DbId) -> Result<bool, CoreError> {
        Ok(uow.movies()?.any(|m| m.cinema_id == id).await?)
    }

    async fn movie_count_in(uow: &UnitOfWork, id: DbId) -> Result<usize, CoreError> {
        Ok(uow.movies()?.count_where(|m| m.cinema_id == id).await?)
    }

    async fn delete_in(
        &self,
        uow: &UnitOfWork,
        id: DbId,
    ) -> Result<Vec<AssetCleanupFailure>, CoreError> {
        let cinema = rows::load::<Cinema>(uow, id).await?;
        rows::ensure_unreferenced(ENTITY, id, Self::movie_count_in(uow, id).await?)?;
        rows::delete(uow, self.blobs.as_ref(), &cinema).await
    }
}
