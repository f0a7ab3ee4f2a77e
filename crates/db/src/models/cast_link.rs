//! Movie-to-actor association.

use marquee_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

use crate::entity::{Entity, SqlValue};

/// A row from the `cast_links` table. The pair is the primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRow, Serialize)]
pub struct CastLink {
    pub movie_id: DbId,
    pub actor_id: DbId,
}

impl Entity for CastLink {
    const NAME: &'static str = "CastLink";
    const TABLE: &'static str = "cast_links";
    const KEY_COLUMNS: &'static [&'static str] = &["movie_id", "actor_id"];
    const VALUE_COLUMNS: &'static [&'static str] = &[];
    const GENERATED_KEY: bool = false;

    fn key_values(&self) -> Vec<SqlValue> {
        vec![self.movie_id.into(), self.actor_id.into()]
    }

    fn values(&self) -> Vec<SqlValue> {
        Vec::new()
    }
}
