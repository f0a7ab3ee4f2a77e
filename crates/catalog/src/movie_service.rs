//! Movie aggregate: the movie row, its cast links, its gallery rows and the
//! poster and gallery files.
//!
//! Database writes of one operation are atomic. File writes are not part of
//! that atomicity: a failure after an upload leaves the file behind, and a
//! failure after a best-effort delete leaves the row pointing at a missing
//! file. Both cases are logged.

use std::collections::HashMap;
use std::sync::Arc;

use marquee_core::cast::distinct_actor_ids;
use marquee_core::error::CoreError;
use marquee_core::search::matches_term;
use marquee_core::storage::{
    AssetCleanupFailure, BlobStore, MOVIE_GALLERY_FOLDER, MOVIE_POSTER_FOLDER,
};
use marquee_core::types::DbId;
use marquee_db::entity::UNSAVED_ID;
use marquee_db::models::actor::Actor;
use marquee_db::models::cast_link::CastLink;
use marquee_db::models::gallery_image::GalleryImage;
use marquee_db::models::movie::Movie;
use marquee_db::models::status::MovieStatus;
use marquee_db::{DbPool, UnitOfWork};

use crate::assets;
use crate::input::MovieInput;
use crate::outcome::{CatalogEvent, GalleryImageRemoval, Outcome};
use crate::rows;
use crate::views::{CastMember, MovieDetails, MovieListing};

const ENTITY: &str = "Movie";

pub struct MovieService<B> {
    pool: DbPool,
    blobs: Arc<B>,
}

impl<B> Clone for MovieService<B> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            blobs: Arc::clone(&self.blobs),
        }
    }
}

impl<B: BlobStore> MovieService<B> {
    pub fn new(pool: DbPool, blobs: Arc<B>) -> Self {
        Self { pool, blobs }
    }

    fn unit(&self) -> UnitOfWork {
        UnitOfWork::new(self.pool.clone())
    }

    // -- reads --------------------------------------------------------------

    /// Every movie, newest first, with category, cinema and cast resolved.
    pub async fn get_all(&self) -> Result<Vec<MovieListing>, CoreError> {
        let uow = self.unit();
        let result = Self::list_in(&uow).await;
        uow.dispose().await;
        result
    }

    /// The movie row alone.
    pub async fn get_by_id(&self, id: DbId) -> Result<Option<Movie>, CoreError> {
        let uow = self.unit();
        let result = match uow.movies() {
            Ok(movies) => movies.get_by_id(id).await.map_err(CoreError::from),
            Err(err) => Err(err.into()),
        };
        uow.dispose().await;
        result
    }

    /// The movie with category, cinema, cast and gallery.
    pub async fn get_with_details(&self, id: DbId) -> Result<Option<MovieDetails>, CoreError> {
        let uow = self.unit();
        let result = Self::details_in(&uow, id).await;
        uow.dispose().await;
        result
    }

    pub async fn get_by_category(&self, category_id: DbId) -> Result<Vec<MovieListing>, CoreError> {
        self.filtered(|listing| listing.movie.category_id == category_id)
            .await
    }

    pub async fn get_by_cinema(&self, cinema_id: DbId) -> Result<Vec<MovieListing>, CoreError> {
        self.filtered(|listing| listing.movie.cinema_id == cinema_id)
            .await
    }

    pub async fn get_by_status(&self, status: MovieStatus) -> Result<Vec<MovieListing>, CoreError> {
        self.filtered(|listing| listing.movie.status == status).await
    }

    /// Case-insensitive substring match on name or description. A blank
    /// term returns everything.
    pub async fn search(&self, term: &str) -> Result<Vec<MovieListing>, CoreError> {
        self.filtered(|listing| {
            matches_term(
                term,
                [
                    listing.movie.name.as_str(),
                    listing.movie.description.as_str(),
                ],
            )
        })
        .await
    }

    async fn filtered<F>(&self, keep: F) -> Result<Vec<MovieListing>, CoreError>
    where
        F: Fn(&MovieListing) -> bool,
    {
        let listings = self.get_all().await?;
        Ok(listings.into_iter().filter(|listing| keep(listing)).collect())
    }

    async fn list_in(uow: &UnitOfWork) -> Result<Vec<MovieListing>, CoreError> {
        let mut movies = uow.movies()?.get_all().await?;
        movies.sort_by(|a, b| b.id.cmp(&a.id));

        let categories: HashMap<_, _> = uow
            .categories()?
            .get_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let cinemas: HashMap<_, _> = uow
            .cinemas()?
            .get_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let actors = actor_index(uow.actors()?.get_all().await?);
        let links = uow.cast_links()?.get_all().await?;

        Ok(movies
            .into_iter()
            .map(|movie| MovieListing {
                category: categories.get(&movie.category_id).cloned(),
                cinema: cinemas.get(&movie.cinema_id).cloned(),
                cast: cast_of(movie.id, &links, &actors),
                movie,
            })
            .collect())
    }

    async fn details_in(uow: &UnitOfWork, id: DbId) -> Result<Option<MovieDetails>, CoreError> {
        let Some(movie) = uow.movies()?.get_by_id(id).await? else {
            return Ok(None);
        };
        let category = uow.categories()?.get_by_id(movie.category_id).await?;
        let cinema = uow.cinemas()?.get_by_id(movie.cinema_id).await?;
        let links = uow.cast_links()?.find(|link| link.movie_id == id).await?;
        let actors = actor_index(
            uow.actors()?
                .find(|actor| links.iter().any(|link| link.actor_id == actor.id))
                .await?,
        );
        let gallery = uow
            .gallery_images()?
            .find(|image| image.movie_id == id)
            .await?;

        Ok(Some(MovieDetails {
            cast: cast_of(id, &links, &actors),
            movie,
            category,
            cinema,
            gallery,
        }))
    }

    // -- create -------------------------------------------------------------

    /// Create a movie with its cast and gallery.
    ///
    /// Poster and gallery files are uploaded before anything is written; if
    /// one fails nothing is stored. The database writes then run in one
    /// transaction, so no write lock is held while files are transferred.
    /// Files uploaded before a later failure are left in place.
    pub async fn create(&self, input: MovieInput) -> Result<Outcome<Movie>, CoreError> {
        let poster = assets::upload_optional(
            self.blobs.as_ref(),
            input.poster.as_ref(),
            MOVIE_POSTER_FOLDER,
        )
        .await?;
        let mut uploaded: Vec<String> = poster.iter().cloned().collect();

        let gallery = match self
            .blobs
            .upload_many(&input.gallery, MOVIE_GALLERY_FOLDER)
            .await
        {
            Ok(references) => references,
            Err(err) => {
                assets::report_orphaned_uploads("create movie", &uploaded);
                return Err(err.into());
            }
        };
        uploaded.extend(gallery.iter().cloned());

        let uow = self.unit();
        let result = Self::create_in(&uow, &input, poster, gallery).await;
        if result.is_err() {
            if let Err(err) = uow.rollback().await {
                tracing::warn!(error = %err, "Rollback after failed movie creation failed");
            }
            assets::report_orphaned_uploads("create movie", &uploaded);
        }
        uow.dispose().await;

        let movie = result?;
        let id = movie.id;
        tracing::info!(movie_id = id, files = uploaded.len(), "Movie created");
        Ok(Outcome::new(movie, CatalogEvent::Created { entity: ENTITY, id }))
    }

    /// Root, then cast, then gallery rows, each saved in turn inside one
    /// transaction.
    async fn create_in(
        uow: &UnitOfWork,
        input: &MovieInput,
        poster: Option<String>,
        gallery: Vec<String>,
    ) -> Result<Movie, CoreError> {
        uow.begin_transaction().await?;

        let movie = rows::insert(uow, input.to_movie(UNSAVED_ID, poster)).await?;

        uow.cast_links()?.add_range(cast_links(movie.id, &input.actor_ids))?;
        uow.save_changes().await?;

        uow.gallery_images()?.add_range(
            gallery
                .into_iter()
                .map(|reference| GalleryImage::new(movie.id, reference)),
        )?;
        uow.save_changes().await?;

        uow.commit().await?;
        Ok(movie)
    }

    // -- update -------------------------------------------------------------

    /// Replace every scalar field and the cast, optionally swap the poster,
    /// and append gallery images. One save covers all database changes.
    pub async fn update(&self, id: DbId, input: MovieInput) -> Result<Outcome<Movie>, CoreError> {
        let uow = self.unit();
        let mut uploaded = Vec::new();
        let result = self.update_in(&uow, id, &input, &mut uploaded).await;
        if result.is_err() {
            assets::report_orphaned_uploads("update movie", &uploaded);
        }
        uow.dispose().await;

        let (movie, orphaned) = result?;
        tracing::info!(movie_id = id, orphaned = orphaned.len(), "Movie updated");
        Ok(Outcome::new(movie, CatalogEvent::Updated { entity: ENTITY, id }).with_orphans(orphaned))
    }

    async fn update_in(
        &self,
        uow: &UnitOfWork,
        id: DbId,
        input: &MovieInput,
        uploaded: &mut Vec<String>,
    ) -> Result<(Movie, Vec<AssetCleanupFailure>), CoreError> {
        let movies = uow.movies()?;
        let existing = movies
            .get_by_id(id)
            .await?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })?;
        let links = uow.cast_links()?;
        let current_cast = links.find(|link| link.movie_id == id).await?;

        let mut orphaned = Vec::new();
        let main_image = assets::replace(
            self.blobs.as_ref(),
            existing.main_image,
            input.poster.as_ref(),
            MOVIE_POSTER_FOLDER,
            &mut orphaned,
        )
        .await?;
        if input.poster.is_some() {
            uploaded.extend(main_image.iter().cloned());
        }
        let movie = input.to_movie(id, main_image);

        links.delete_range(&current_cast)?;
        links.add_range(cast_links(id, &input.actor_ids))?;

        let references = self
            .blobs
            .upload_many(&input.gallery, MOVIE_GALLERY_FOLDER)
            .await?;
        uploaded.extend(references.iter().cloned());
        uow.gallery_images()?.add_range(
            references
                .into_iter()
                .map(|reference| GalleryImage::new(id, reference)),
        )?;

        movies.update(&movie)?;
        uow.save_changes().await?;
        Ok((movie, orphaned))
    }

    // -- delete -------------------------------------------------------------

    /// Delete a movie. Poster and gallery files are removed best effort;
    /// cast links and gallery rows go with the movie row.
    pub async fn delete(&self, id: DbId) -> Result<Outcome<()>, CoreError> {
        let uow = self.unit();
        let result = self.delete_in(&uow, id).await;
        uow.dispose().await;

        let orphaned = result?;
        tracing::info!(movie_id = id, orphaned = orphaned.len(), "Movie deleted");
        Ok(Outcome::new((), CatalogEvent::Deleted { entity: ENTITY, id }).with_orphans(orphaned))
    }

    async fn delete_in(
        &self,
        uow: &UnitOfWork,
        id: DbId,
    ) -> Result<Vec<AssetCleanupFailure>, CoreError> {
        let movies = uow.movies()?;
        let movie = movies
            .get_by_id(id)
            .await?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })?;
        let gallery = uow
            .gallery_images()?
            .find(|image| image.movie_id == id)
            .await?;

        let references: Vec<String> = movie
            .main_image
            .iter()
            .cloned()
            .chain(gallery.into_iter().map(|image| image.image_url))
            .collect();
        let orphaned = assets::discard_all(self.blobs.as_ref(), &references).await;

        movies.delete(&movie)?;
        uow.save_changes().await?;
        Ok(orphaned)
    }

    /// Remove one gallery image and its file. Failures are reported in the
    /// returned value, never raised.
    pub async fn delete_gallery_image(&self, image_id: DbId) -> GalleryImageRemoval {
        let uow = self.unit();
        let removal = match self.delete_gallery_image_in(&uow, image_id).await {
            Ok(removal) => removal,
            Err(err) => {
                tracing::warn!(image_id, error = %err, "Gallery image removal failed");
                GalleryImageRemoval::Failed {
                    reason: err.to_string(),
                }
            }
        };
        uow.dispose().await;
        removal
    }

    async fn delete_gallery_image_in(
        &self,
        uow: &UnitOfWork,
        image_id: DbId,
    ) -> Result<GalleryImageRemoval, CoreError> {
        let images = uow.gallery_images()?;
        let Some(image) = images.get_by_id(image_id).await? else {
            return Ok(GalleryImageRemoval::NotFound);
        };

        let orphaned_asset = assets::discard(self.blobs.as_ref(), Some(&image.image_url)).await;
        images.delete(&image)?;
        uow.save_changes().await?;

        tracing::info!(image_id, movie_id = image.movie_id, "Gallery image removed");
        Ok(GalleryImageRemoval::Removed {
            image_id,
            movie_id: image.movie_id,
            orphaned_asset,
        })
    }
}

fn cast_links(movie_id: DbId, actor_ids: &[DbId]) -> Vec<CastLink> {
    distinct_actor_ids(actor_ids)
        .into_iter()
        .map(|actor_id| CastLink { movie_id, actor_id })
        .collect()
}

fn actor_index(actors: Vec<Actor>) -> HashMap<DbId, Actor> {
    actors.into_iter().map(|actor| (actor.id, actor)).collect()
}

/// Cast members of `movie_id`, in link order. Links to unknown actors are
/// skipped.
fn cast_of(movie_id: DbId, links: &[CastLink], actors: &HashMap<DbId, Actor>) -> Vec<CastMember> {
    links
        .iter()
        .filter(|link| link.movie_id == movie_id)
        .filter_map(|link| actors.get(&link.actor_id))
        .map(CastMember::from)
        .collect()
}
