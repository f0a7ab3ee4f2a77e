//! Steps shared by the single-table services: a row with at most one image.

use marquee_core::error::CoreError;
use marquee_core::storage::{
    AssetCleanupFailure, BlobStore, UploadedFile, ACTOR_FOLDER, CATEGORY_FOLDER, CINEMA_FOLDER,
};
use marquee_core::types::DbId;
use marquee_db::entity::{Entity, IdEntity};
use marquee_db::models::actor::Actor;
use marquee_db::models::category::Category;
use marquee_db::models::cinema::Cinema;
use marquee_db::UnitOfWork;

use crate::assets;

/// A row that owns an optional image stored under [`Self::FOLDER`].
pub(crate) trait ImageRow: IdEntity {
    const FOLDER: &'static str;

    fn image(&self) -> Option<&str>;
}

impl ImageRow for Category {
    const FOLDER: &'static str = CATEGORY_FOLDER;

    fn image(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

impl ImageRow for Cinema {
    const FOLDER: &'static str = CINEMA_FOLDER;

    fn image(&self) -> Option<&str> {
        self.logo.as_deref()
    }
}

impl ImageRow for Actor {
    const FOLDER: &'static str = ACTOR_FOLDER;

    fn image(&self) -> Option<&str> {
        self.profile_picture.as_deref()
    }
}

/// Stage `entity`, save, and return the stored row with its generated key.
pub(crate) async fn insert<T: Entity>(uow: &UnitOfWork, entity: T) -> Result<T, CoreError> {
    let staged = uow.repository::<T>()?.add(entity)?;
    uow.save_changes().await?;
    staged
        .persisted()
        .cloned()
        .ok_or_else(|| CoreError::Internal(format!("Saved {} has no stored row", T::NAME)))
}

pub(crate) async fn load<T: IdEntity>(uow: &UnitOfWork, id: DbId) -> Result<T, CoreError> {
    uow.repository::<T>()?
        .get_by_id(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: T::NAME,
            id,
        })
}

/// Upload the image, if any, then insert the row `build` makes from its
/// reference.
pub(crate) async fn create<T, B, F>(
    uow: &UnitOfWork,
    blobs: &B,
    image: Option<&UploadedFile>,
    build: F,
) -> Result<T, CoreError>
where
    T: ImageRow,
    B: BlobStore,
    F: FnOnce(Option<String>) -> T,
{
    let reference = assets::upload_optional(blobs, image, T::FOLDER).await?;
    let uploaded: Vec<String> = reference.iter().cloned().collect();

    let result = insert(uow, build(reference)).await;
    if result.is_err() {
        let operation = format!("create {}", T::NAME.to_lowercase());
        assets::report_orphaned_uploads(&operation, &uploaded);
    }
    result
}

/// Full replace of row `id`. A new image supersedes the stored one; without
/// one the stored reference is kept.
pub(crate) async fn update<T, B, F>(
    uow: &UnitOfWork,
    blobs: &B,
    id: DbId,
    image: Option<&UploadedFile>,
    orphaned: &mut Vec<AssetCleanupFailure>,
    build: F,
) -> Result<T, CoreError>
where
    T: ImageRow,
    B: BlobStore,
    F: FnOnce(Option<String>) -> T,
{
    let existing = load::<T>(uow, id).await?;
    let current = existing.image().map(str::to_string);
    let reference = assets::replace(blobs, current, image, T::FOLDER, orphaned).await?;

    let row = build(reference);
    uow.repository::<T>()?.update(&row)?;
    uow.save_changes().await?;
    Ok(row)
}

/// Delete the row, then its image best effort.
///
/// The file is only touched once the row is gone, so a rejected delete
/// leaves the row and its image intact.
pub(crate) async fn delete<T, B>(
    uow: &UnitOfWork,
    blobs: &B,
    row: &T,
) -> Result<Vec<AssetCleanupFailure>, CoreError>
where
    T: ImageRow,
    B: BlobStore,
{
    uow.repository::<T>()?.delete(row)?;
    uow.save_changes().await?;
    Ok(assets::discard(blobs, row.image()).await.into_iter().collect())
}

/// Refuse to delete a row that `movie_count` movies still point at.
pub(crate) fn ensure_unreferenced(
    entity: &'static str,
    id: DbId,
    movie_count: usize,
) -> Result<(), CoreError> {
    let reason = match movie_count {
        0 => return Ok(()),
        1 => "it is used by 1 movie".to_string(),
        n => format!("it is used by {n} movies"),
    };
    Err(CoreError::ReferentialViolation { entity, id, reason })
}
