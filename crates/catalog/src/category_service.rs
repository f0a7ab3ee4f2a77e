//! Categories: one row and an optional cover image each.

use std::sync::Arc;

use marquee_core::error::CoreError;
use marquee_core::storage::{AssetCleanupFailure, BlobStore};
use marquee_core::types::DbId;
use marquee_db::entity::UNSAVED_ID;
use marquee_db::models::category::Category;
use marquee_db::{DbPool, UnitOfWork};

use crate::rows;
use crate::input::CategoryInput;
use crate::outcome::{CatalogEvent, Outcome};
use crate::views::{CategorySummary, CategoryWithMovies};

const ENTITY: &str = "Category";

pub struct CategoryService<B> {
    pool: DbPool,
    blobs: Arc<B>,
}

impl<B> Clone for CategoryService<B> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            blobs: Arc::clone(&self.blobs),
        }
    }
}

impl<B: BlobStore> CategoryService<B> {
    pub fn new(pool: DbPool, blobs: Arc<B>) -> Self {
        Self { pool, blobs }
    }

    fn unit(&self) -> UnitOfWork {
        UnitOfWork::new(self.pool.clone())
    }

    /// Every category with the number of movies filed under it.
    pub async fn get_all(&self) -> Result<Vec<CategorySummary>, CoreError> {
        let uow = self.unit();
        let result = Self::list_in(&uow).await;
        uow.dispose().await;
        result
    }

    pub async fn get_by_id(&self, id: DbId) -> Result<Option<Category>, CoreError> {
        let uow = self.unit();
        let result = Self::find_in(&uow, id).await;
        uow.dispose().await;
        result
    }

    pub async fn get_with_movies(&self, id: DbId) -> Result<Option<CategoryWithMovies>, CoreError> {
        let uow = self.unit();
        let result = Self::with_movies_in(&uow, id).await;
        uow.dispose().await;
        result
    }

    pub async fn create(&self, input: CategoryInput) -> Result<Outcome<Category>, CoreError> {
        let uow = self.unit();
        let result = rows::create(&uow, self.blobs.as_ref(), input.image.as_ref(), |image_url| {
            input.to_category(UNSAVED_ID, image_url)
        })
        .await;
        uow.dispose().await;

        let category = result?;
        let id = category.id;
        tracing::info!(category_id = id, "Category created");
        Ok(Outcome::new(category, CatalogEvent::Created { entity: ENTITY, id }))
    }

    /// Full replace. A new image supersedes the old one.
    pub async fn update(
        &self,
        id: DbId,
        input: CategoryInput,
    ) -> Result<Outcome<Category>, CoreError> {
        let uow = self.unit();
        let mut orphaned = Vec::new();
        let result = rows::update(
            &uow,
            self.blobs.as_ref(),
            id,
            input.image.as_ref(),
            &mut orphaned,
            |image_url| input.to_category(id, image_url),
        )
        .await;
        uow.dispose().await;

        let category = result?;
        tracing::info!(category_id = id, "Category updated");
        Ok(Outcome::new(category, CatalogEvent::Updated { entity: ENTITY, id }).with_orphans(orphaned))
    }

    /// Delete a category no movie refers to.
    pub async fn delete(&self, id: DbId) -> Result<Outcome<()>, CoreError> {
        let uow = self.unit();
        let result = self.delete_in(&uow, id).await;
        uow.dispose().await;

        let orphaned = result?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(Outcome::new((), CatalogEvent::Deleted { entity: ENTITY, id }).with_orphans(orphaned))
    }

    /// Whether no movie refers to the category.
    pub async fn can_delete(&self, id: DbId) -> Result<bool, CoreError> {
        let uow = self.unit();
        let result = Self::is_referenced_in(&uow, id).await.map(|referenced| !referenced);
        uow.dispose().await;
        result
    }

    // -- unit-scoped steps --------------------------------------------------

    async fn list_in(uow: &UnitOfWork) -> Result<Vec<CategorySummary>, CoreError> {
        let categories = uow.categories()?.get_all().await?;
        let movies = uow.movies()?.get_all().await?;
        Ok(categories
            .into_iter()
            .map(|category| CategorySummary {
                movie_count: movies
                    .iter()
                    .filter(|m| m.category_id == category.id)
                    .count(),
                category,
            })
            .collect())
    }

    async fn find_in(uow: &UnitOfWork, id: DbId) -> Result<Option<Category>, CoreError> {
        Ok(uow.categories()?.get_by_id(id).await?)
    }

    async fn with_movies_in(
        uow: &UnitOfWork,
        id: DbId,
    ) -> Result<Option<CategoryWithMovies>, CoreError> {
        let Some(category) = Self::find_in(uow, id).await? else {
            return Ok(None);
        };
        let movies = uow.movies()?.find(|m| m.category_id == id).await?;
        Ok(Some(CategoryWithMovies { category, movies }))
    }

    async fn is_referenced_in(uow: &UnitOfWork, id: DbId) -> Result<bool, CoreError> {
        Ok(uow.movies()?.any(|m| m.category_id == id).await?)
    }

    async fn movie_count_in(uow: &UnitOfWork, id: DbId) -> Result<usize, CoreError> {
        Ok(uow.movies()?.count_where(|m| m.category_id == id).await?)
    }

    async fn delete_in(
        &self,
        uow: &UnitOfWork,
        id: DbId,
    ) -> Result<Vec<AssetCleanupFailure>, CoreError> {
        let category = rows::load::<Category>(uow, id).await?;
        rows::ensure_unreferenced(ENTITY, id, Self::movie_count_in(uow, id).await?)?;
        rows::delete(uow, self.blobs.as_ref(), &category).await
    }
}
