//! Actor entity model.

use chrono::NaiveDate;
use marquee_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

use crate::entity::{Entity, IdEntity, SqlValue};

/// A row from the `actors` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Actor {
    pub id: DbId,
    pub name: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl Entity for Actor {
    const NAME: &'static str = "Actor";
    const TABLE: &'static str = "actors";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const VALUE_COLUMNS: &'static [&'static str] =
        &["name", "profile_picture", "bio", "date_of_birth"];
    const GENERATED_KEY: bool = true;

    fn key_values(&self) -> Vec<SqlValue> {
        vec![self.id.into()]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.name.as_str().into(),
            (&self.profile_picture).into(),
            (&self.bio).into(),
            self.date_of_birth.into(),
        ]
    }
}

impl IdEntity for Actor {
    fn id(&self) -> DbId {
        self.id
    }
}
