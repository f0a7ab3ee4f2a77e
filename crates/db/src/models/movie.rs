//! Movie entity model: the aggregate root.

use marquee_core::price::Price;
use marquee_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::entity::{Entity, IdEntity, SqlValue};
use crate::models::status::MovieStatus;

/// A row from the `movies` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Movie {
    pub id: DbId,
    pub name: String,
    pub description: String,
    #[sqlx(try_from = "i64")]
    pub price: Price,
    #[sqlx(try_from = "i16")]
    pub status: MovieStatus,
    pub release_date_time: Timestamp,
    pub duration_minutes: Option<i32>,
    /// Asset reference of the poster.
    pub main_image: Option<String>,
    pub category_id: DbId,
    pub cinema_id: DbId,
}

impl Entity for Movie {
    const NAME: &'static str = "Movie";
    const TABLE: &'static str = "movies";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const VALUE_COLUMNS: &'static [&'static str] = &[
        "name",
        "description",
        "price",
        "status",
        "release_date_time",
        "duration_minutes",
        "main_image",
        "category_id",
        "cinema_id",
    ];
    const GENERATED_KEY: bool = true;

    fn key_values(&self) -> Vec<SqlValue> {
        vec![self.id.into()]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.name.as_str().into(),
            self.description.as_str().into(),
            self.price.cents().into(),
            self.status.id().into(),
            self.release_date_time.into(),
            self.duration_minutes.into(),
            (&self.main_image).into(),
            self.category_id.into(),
            self.cinema_id.into(),
        ]
    }
}

impl IdEntity for Movie {
    fn id(&self) -> DbId {
        self.id
    }
}
