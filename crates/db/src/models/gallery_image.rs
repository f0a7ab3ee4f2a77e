//! Gallery image entity model.

use marquee_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

use crate::entity::{Entity, IdEntity, SqlValue, UNSAVED_ID};

/// A row from the `gallery_images` table. Display order is `id`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct GalleryImage {
    pub id: DbId,
    pub movie_id: DbId,
    pub image_url: String,
    pub caption: Option<String>,
}

impl GalleryImage {
    /// An unsaved image for `movie_id` pointing at `image_url`.
    pub fn new(movie_id: DbId, image_url: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            movie_id,
            image_url: image_url.into(),
            caption: None,
        }
    }
}

impl Entity for GalleryImage {
    const NAME: &'static str = "GalleryImage";
    const TABLE: &'static str = "gallery_images";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const VALUE_COLUMNS: &'static [&'static str] = &["movie_id", "image_url", "caption"];
    const GENERATED_KEY: bool = true;

    fn key_values(&self) -> Vec<SqlValue> {
        vec![self.id.into()]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.movie_id.into(),
            self.image_url.as_str().into(),
            (&self.caption).into(),
        ]
    }
}

impl IdEntity for GalleryImage {
    fn id(&self) -> DbId {
        self.id
    }
}
