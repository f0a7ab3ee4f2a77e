//! Category entity model.

use marquee_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

use crate::entity::{Entity, IdEntity, SqlValue};

/// A row from the `categories` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub image_url: Option<String>,
}

impl Entity for Category {
    const NAME: &'static str = "Category";
    const TABLE: &'static str = "categories";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const VALUE_COLUMNS: &'static [&'static str] = &["name", "image_url"];
    const GENERATED_KEY: bool = true;

    fn key_values(&self) -> Vec<SqlValue> {
        vec![self.id.into()]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.name.as_str().into(), (&self.image_url).into()]
    }
}

impl IdEntity for Category {
    fn id(&self) -> DbId {
        self.id
    }
}
