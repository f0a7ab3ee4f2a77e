//! Cinema entity model.

use marquee_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

use crate::entity::{Entity, IdEntity, SqlValue};

/// A row from the `cinemas` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Cinema {
    pub id: DbId,
    pub name: String,
    /// Asset reference of the logo image.
    pub logo: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
}

impl Entity for Cinema {
    const NAME: &'static str = "Cinema";
    const TABLE: &'static str = "cinemas";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];
    const VALUE_COLUMNS: &'static [&'static str] = &["name", "logo", "description", "address"];
    const GENERATED_KEY: bool = true;

    fn key_values(&self) -> Vec<SqlValue> {
        vec![self.id.into()]
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.name.as_str().into(),
            (&self.logo).into(),
            (&self.description).into(),
            (&self.address).into(),
        ]
    }
}

impl IdEntity for Cinema {
    fn id(&self) -> DbId {
        self.id
    }
}
