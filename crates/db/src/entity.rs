//! Table metadata for entities handled by the generic [`Repository`].
//!
//! An [`Entity`] describes its table, key and value columns, and how to turn
//! an instance into bind parameters. Rows come back through `sqlx::FromRow`.
//!
//! [`Repository`]: crate::repository::Repository

use std::fmt;

use chrono::NaiveDate;
use marquee_core::types::{DbId, Timestamp};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite};

/// Id carried by an entity that has not been inserted yet.
pub const UNSAVED_ID: DbId = 0;

/// A row type stored in one table.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Clone + Send + Sync + Unpin + 'static {
    /// Human-readable name used in errors ("Movie").
    const NAME: &'static str;

    const TABLE: &'static str;

    /// Primary key columns, in order.
    const KEY_COLUMNS: &'static [&'static str];

    /// Every non-key column.
    const VALUE_COLUMNS: &'static [&'static str];

    /// `true` when the store assigns the key on insert. Such keys are
    /// omitted from the insert column list.
    const GENERATED_KEY: bool;

    /// Bind values for [`Self::KEY_COLUMNS`], same order.
    fn key_values(&self) -> Vec<SqlValue>;

    /// Bind values for [`Self::VALUE_COLUMNS`], same order.
    fn values(&self) -> Vec<SqlValue>;
}

/// An entity keyed by a single integer `id` column.
pub trait IdEntity: Entity {
    fn id(&self) -> DbId;
}

/// A bind parameter. `None` binds SQL `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(Option<i64>),
    Text(Option<String>),
    Timestamp(Option<Timestamp>),
    Date(Option<NaiveDate>),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Integer(Some(v)) => write!(f, "{v}"),
            SqlValue::Text(Some(v)) => write!(f, "'{v}'"),
            SqlValue::Timestamp(Some(v)) => write!(f, "{}", v.to_rfc3339()),
            SqlValue::Date(Some(v)) => write!(f, "{v}"),
            SqlValue::Integer(None)
            | SqlValue::Text(None)
            | SqlValue::Timestamp(None)
            | SqlValue::Date(None) => f.write_str("NULL"),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(Some(value))
    }
}

impl From<i16> for SqlValue {
    fn from(value: i16) -> Self {
        SqlValue::Integer(Some(i64::from(value)))
    }
}

impl From<Option<i32>> for SqlValue {
    fn from(value: Option<i32>) -> Self {
        SqlValue::Integer(value.map(i64::from))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(Some(value.to_string()))
    }
}

impl From<&Option<String>> for SqlValue {
    fn from(value: &Option<String>) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<Timestamp> for SqlValue {
    fn from(value: Timestamp) -> Self {
        SqlValue::Timestamp(Some(value))
    }
}

impl From<Option<NaiveDate>> for SqlValue {
    fn from(value: Option<NaiveDate>) -> Self {
        SqlValue::Date(value)
    }
}

pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Bind `values` onto `query` in order.
pub(crate) fn bind_values<'q>(mut query: SqliteQuery<'q>, values: &[SqlValue]) -> SqliteQuery<'q> {
    for value in values {
        query = match value.clone() {
            SqlValue::Integer(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Timestamp(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
        };
    }
    query
}

// ---------------------------------------------------------------------------
// SQL builders
// ---------------------------------------------------------------------------

fn all_columns<T: Entity>() -> String {
    T::KEY_COLUMNS
        .iter()
        .chain(T::VALUE_COLUMNS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// `a = ? AND b = ?` over the key columns.
fn key_predicate<T: Entity>() -> String {
    T::KEY_COLUMNS
        .iter()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Every row, ascending by key.
pub(crate) fn select_sql<T: Entity>() -> String {
    format!(
        "SELECT {} FROM {} ORDER BY {}",
        all_columns::<T>(),
        T::TABLE,
        T::KEY_COLUMNS.join(", ")
    )
}

/// One row by key.
pub(crate) fn select_by_key_sql<T: Entity>() -> String {
    format!(
        "SELECT {} FROM {} WHERE {}",
        all_columns::<T>(),
        T::TABLE,
        key_predicate::<T>()
    )
}

pub(crate) fn count_sql<T: Entity>() -> String {
    format!("SELECT COUNT(*) FROM {}", T::TABLE)
}

/// Insert returning the stored row, plus the parameters to bind.
pub(crate) fn insert_sql<T: Entity>(entity: &T) -> (String, Vec<SqlValue>) {
    let (columns, params): (Vec<&str>, Vec<SqlValue>) = if T::GENERATED_KEY {
        (T::VALUE_COLUMNS.to_vec(), entity.values())
    } else {
        let columns = T::KEY_COLUMNS.iter().chain(T::VALUE_COLUMNS).copied().collect();
        let mut params = entity.key_values();
        params.extend(entity.values());
        (columns, params)
    };
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders}) RETURNING {}",
        T::TABLE,
        columns.join(", "),
        all_columns::<T>()
    );
    (sql, params)
}

/// Full replace of the value columns. `None` when the entity has none.
pub(crate) fn update_sql<T: Entity>(entity: &T) -> Option<(String, Vec<SqlValue>)> {
    if T::VALUE_COLUMNS.is_empty() {
        return None;
    }
    let assignments = T::VALUE_COLUMNS
        .iter()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE {}",
        T::TABLE,
        key_predicate::<T>()
    );
    let mut params = entity.values();
    params.extend(entity.key_values());
    Some((sql, params))
}

pub(crate) fn delete_sql<T: Entity>(entity: &T) -> (String, Vec<SqlValue>) {
    let sql = format!("DELETE FROM {} WHERE {}", T::TABLE, key_predicate::<T>());
    (sql, entity.key_values())
}

/// Render key values for error messages: `3, 7`.
pub(crate) fn describe_key<T: Entity>(entity: &T) -> String {
    entity
        .key_values()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cast_link::CastLink;
    use crate::models::category::Category;

    fn category() -> Category {
        Category {
            id: 4,
            name: "Drama".into(),
            image_url: None,
        }
    }

    #[test]
    fn select_orders_by_key() {
        assert_eq!(
            select_sql::<Category>(),
            "SELECT id, name, image_url FROM categories ORDER BY id"
        );
        assert_eq!(
            select_sql::<CastLink>(),
            "SELECT movie_id, actor_id FROM cast_links ORDER BY movie_id, actor_id"
        );
    }

    #[test]
    fn insert_skips_generated_key() {
        let (sql, params) = insert_sql(&category());
        assert_eq!(
            sql,
            "INSERT INTO categories (name, image_url) VALUES (?, ?) RETURNING id, name, image_url"
        );
        assert_eq!(params, vec![SqlValue::from("Drama"), SqlValue::Text(None)]);
    }

    #[test]
    fn insert_keeps_natural_key() {
        let (sql, params) = insert_sql(&CastLink {
            movie_id: 1,
            actor_id: 2,
        });
        assert_eq!(
            sql,
            "INSERT INTO cast_links (movie_id, actor_id) VALUES (?, ?) RETURNING movie_id, actor_id"
        );
        assert_eq!(params, vec![SqlValue::from(1_i64), SqlValue::from(2_i64)]);
    }

    #[test]
    fn update_binds_values_then_key() {
        let (sql, params) = update_sql(&category()).expect("categories have value columns");
        assert_eq!(sql, "UPDATE categories SET name = ?, image_url = ? WHERE id = ?");
        assert_eq!(params.last(), Some(&SqlValue::from(4_i64)));
    }

    #[test]
    fn key_only_entities_have_nothing_to_update() {
        assert!(update_sql(&CastLink {
            movie_id: 1,
            actor_id: 2
        })
        .is_none());
    }

    #[test]
    fn composite_key_predicate() {
        let (sql, _) = delete_sql(&CastLink {
            movie_id: 1,
            actor_id: 2,
        });
        assert_eq!(sql, "DELETE FROM cast_links WHERE movie_id = ? AND actor_id = ?");
        assert_eq!(
            describe_key(&CastLink {
                movie_id: 1,
                actor_id: 2
            }),
            "1, 2"
        );
    }
}
