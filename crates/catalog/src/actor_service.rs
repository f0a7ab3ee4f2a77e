//! Actors. Deleting an actor also drops their cast links.

use std::sync::Arc;

use marquee_core::error::CoreError;
use marquee_core::storage::{AssetCleanupFailure, BlobStore};
use marquee_core::types::DbId;
use marquee_db::entity::UNSAVED_ID;
use marquee_db::models::actor::Actor;
use marquee_db::models::analytics::ActorMovieCount;
use marquee_db::repositories::AnalyticsRepo;
use marquee_db::{DbError, DbPool, UnitOfWork};

use crate::rows;
use crate::input::ActorInput;
use crate::outcome::{CatalogEvent, Outcome};
use crate::views::{ActorSummary, ActorWithMovies};

const ENTITY: &str = "Actor";

pub struct ActorService<B> {
    pool: DbPool,
    blobs: Arc<B>,
}

impl<B> Clone for ActorService<B> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            blobs: Arc::clone(&self.blobs),
        }
    }
}

impl<B: BlobStore> ActorService<B> {
    pub fn new(pool: DbPool, blobs: Arc<B>) -> Self {
        Self { pool, blobs }
    }

    fn unit(&self) -> UnitOfWork {
        UnitOfWork::new(self.pool.clone())
    }

    /// Every actor with the number of movies they appear in.
    pub async fn get_all(&self) -> Result<Vec<ActorSummary>, CoreError> {
        let uow = self.unit();
        let result = Self::list_in(&uow).await;
        uow.dispose().await;
        result
    }

    pub async fn get_by_id(&self, id: DbId) -> Result<Option<Actor>, CoreError> {
        let uow = self.unit();
        let result = Self::find_in(&uow, id).await;
        uow.dispose().await;
        result
    }

    pub async fn get_with_movies(&self, id: DbId) -> Result<Option<ActorWithMovies>, CoreError> {
        let uow = self.unit();
        let result = Self::with_movies_in(&uow, id).await;
        uow.dispose().await;
        result
    }

    /// The `count` actors with the most movies. Ties keep id order.
    pub async fn top_by_movie_count(&self, count: u32) -> Result<Vec<ActorMovieCount>, CoreError> {
        let top = AnalyticsRepo::top_actors(&self.pool, i64::from(count))
            .await
            .map_err(DbError::from)?;
        Ok(top)
    }

    pub async fn create(&self, input: ActorInput) -> Result<Outcome<Actor>, CoreError> {
        let uow = self.unit();
        let result = rows::create(
            &uow,
            self.blobs.as_ref(),
            input.profile_picture.as_ref(),
            |picture| input.to_actor(UNSAVED_ID, picture),
        )
        .await;
        uow.dispose().await;

        let actor = result?;
        let id = actor.id;
        tracing::info!(actor_id = id, "Actor created");
        Ok(Outcome::new(actor, CatalogEvent::Created { entity: ENTITY, id }))
    }

    /// Full replace. A new picture supersedes the old one.
    pub async fn update(&self, id: DbId, input: ActorInput) -> Result<Outcome<Actor>, CoreError> {
        let uow = self.unit();
        let mut orphaned = Vec::new();
        let result = rows::update(
            &uow,
            self.blobs.as_ref(),
            id,
            input.profile_picture.as_ref(),
            &mut orphaned,
            |picture| input.to_actor(id, picture),
        )
        .await;
        uow.dispose().await;

        let actor = result?;
        tracing::info!(actor_id = id, "Actor updated");
        Ok(Outcome::new(actor, CatalogEvent::Updated { entity: ENTITY, id }).with_orphans(orphaned))
    }

    pub async fn delete(&self, id: DbId) -> Result<Outcome<()>, CoreError> {
        let uow = self.unit();
        let result = self.delete_in(&uow, id).await;
        uow.dispose().await;

        let orphaned = result?;
        tracing::info!(actor_id = id, "Actor deleted");
        Ok(Outcome::new((), CatalogEvent::Deleted { entity: ENTITY, id }).with_orphans(orphaned))
    }

    // -- unit-scoped steps --------------------------------------------------

    async fn list_in(uow: &UnitOfWork) -> Result<Vec<ActorSummary>, CoreError> {
        let actors = uow.actors()?.get_all().await?;
        let links = uow.cast_links()?.get_all().await?;
        Ok(actors
            .into_iter()
            .map(|actor| ActorSummary {
                movie_count: links.iter().filter(|l| l.actor_id == actor.id).count(),
                actor,
            })
            .collect())
    }

    async fn find_in(uow: &UnitOfWork, id: DbId) -> Result<Option<Actor>, CoreError> {
        Ok(uow.actors()?.get_by_id(id).await?)
    }

    async fn with_movies_in(
        uow: &UnitOfWork,
        id: DbId,
    ) -> Result<Option<ActorWithMovies>, CoreError> {
        let Some(actor) = Self::find_in(uow, id).await? else {
            return Ok(None);
        };
        let links = uow.cast_links()?.find(|l| l.actor_id == id).await?;
        let movies = uow
            .movies()?
            .find(|m| links.iter().any(|l| l.movie_id == m.id))
            .await?;
        Ok(Some(ActorWithMovies { actor, movies }))
    }

    async fn delete_in(
        &self,
        uow: &UnitOfWork,
        id: DbId,
    ) -> Result<Vec<AssetCleanupFailure>, CoreError> {
        let actor = rows::load::<Actor>(uow, id).await?;
        rows::delete(uow, self.blobs.as_ref(), &actor).await
    }
}
