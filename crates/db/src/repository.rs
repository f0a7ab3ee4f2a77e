//! Generic per-entity store.
//!
//! Reads go straight to the database (inside the owning unit of work's
//! transaction when one is open). Writes are only staged; they reach the
//! database when the unit of work saves.

use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use marquee_core::types::DbId;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use crate::entity::{
    count_sql, delete_sql, describe_key, insert_sql, select_by_key_sql, select_sql, update_sql,
    Entity, IdEntity, SqlValue,
};
use crate::unit_of_work::{InsertSink, PendingWrite, Session, WriteKind};
use crate::DbError;

/// Handle to an entity staged for insertion.
///
/// Empty until the batch holding the insert has been saved, then holds the
/// stored row including its generated key.
#[derive(Debug)]
pub struct Staged<T> {
    slot: Arc<OnceLock<T>>,
}

impl<T> Clone for Staged<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Entity> Staged<T> {
    /// The stored row, or `None` while the insert is still pending.
    pub fn persisted(&self) -> Option<&T> {
        self.slot.get()
    }

    pub fn is_persisted(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T: IdEntity> Staged<T> {
    /// Generated id, once saved.
    pub fn id(&self) -> Option<DbId> {
        self.slot.get().map(IdEntity::id)
    }
}

/// Decodes the `RETURNING` row of an insert and fills the staged handle
/// once the batch has been saved.
struct SlotSink<T> {
    slot: Arc<OnceLock<T>>,
    row: Option<T>,
}

impl<T: Entity> InsertSink for SlotSink<T> {
    fn accept(&mut self, row: &SqliteRow) -> Result<(), sqlx::Error> {
        self.row = Some(T::from_row(row)?);
        Ok(())
    }

    fn publish(self: Box<Self>) {
        if let Some(row) = self.row {
            // A slot is only ever filled once: each sink belongs to one insert.
            let _ = self.slot.set(row);
        }
    }
}

/// Store for one entity type, bound to a unit of work.
pub struct Repository<T> {
    session: Arc<Session>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl<T: Entity> Repository<T> {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            _entity: PhantomData,
        }
    }

    // -- reads --------------------------------------------------------------

    /// Every row, ascending by key.
    pub async fn get_all(&self) -> Result<Vec<T>, DbError> {
        self.session.fetch_all(&select_sql::<T>(), &[]).await
    }

    /// Rows matching `predicate`, ascending by key.
    pub async fn find<F>(&self, predicate: F) -> Result<Vec<T>, DbError>
    where
        F: Fn(&T) -> bool + Send,
    {
        let rows = self.get_all().await?;
        Ok(rows.into_iter().filter(|row| predicate(row)).collect())
    }

    /// The single row matching `predicate`, if any.
    ///
    /// More than one match is an error rather than an arbitrary pick.
    pub async fn single_or_default<F>(&self, predicate: F) -> Result<Option<T>, DbError>
    where
        F: Fn(&T) -> bool + Send,
    {
        let mut matches = self.find(predicate).await?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(DbError::AmbiguousResult {
                entity: T::NAME,
                count,
            }),
        }
    }

    /// Rows in the table, counted by the database. Agrees with
    /// `count_where(|_| true)`.
    pub async fn count(&self) -> Result<usize, DbError> {
        let rows = self.session.fetch_count(&count_sql::<T>()).await?;
        Ok(usize::try_from(rows).unwrap_or_default())
    }

    pub async fn count_where<F>(&self, predicate: F) -> Result<usize, DbError>
    where
        F: Fn(&T) -> bool + Send,
    {
        Ok(self.find(predicate).await?.len())
    }

    pub async fn any<F>(&self, predicate: F) -> Result<bool, DbError>
    where
        F: Fn(&T) -> bool + Send,
    {
        let rows = self.get_all().await?;
        Ok(rows.iter().any(|row| predicate(row)))
    }

    // -- staged writes ------------------------------------------------------

    /// Stage an insert. The returned handle is filled after the save.
    pub fn add(&self, entity: T) -> Result<Staged<T>, DbError> {
        let (sql, params) = insert_sql(&entity);
        let slot = Arc::new(OnceLock::new());
        let sink = SlotSink {
            slot: Arc::clone(&slot),
            row: None,
        };
        self.session.stage(PendingWrite {
            table: T::TABLE,
            kind: WriteKind::Insert,
            sql,
            params,
            key: describe_key(&entity),
            sink: Some(Box::new(sink)),
        })?;
        Ok(Staged { slot })
    }

    pub fn add_range<I>(&self, entities: I) -> Result<Vec<Staged<T>>, DbError>
    where
        I: IntoIterator<Item = T>,
    {
        entities.into_iter().map(|entity| self.add(entity)).collect()
    }

    /// Stage a full replace of every value column, keyed by primary key.
    ///
    /// Key-only entities have nothing to replace and stage nothing.
    pub fn update(&self, entity: &T) -> Result<(), DbError> {
        let Some((sql, params)) = update_sql(entity) else {
            return self.session.ensure_active();
        };
        self.stage_keyed(WriteKind::Update, sql, params, entity)
    }

    pub fn delete(&self, entity: &T) -> Result<(), DbError> {
        let (sql, params) = delete_sql(entity);
        self.stage_keyed(WriteKind::Delete, sql, params, entity)
    }

    pub fn delete_range<'a, I>(&self, entities: I) -> Result<(), DbError>
    where
        I: IntoIterator<Item = &'a T>,
    {
        entities.into_iter().try_for_each(|entity| self.delete(entity))
    }

    fn stage_keyed(
        &self,
        kind: WriteKind,
        sql: String,
        params: Vec<SqlValue>,
        entity: &T,
    ) -> Result<(), DbError> {
        self.session.stage(PendingWrite {
            table: T::TABLE,
            kind,
            sql,
            params,
            key: describe_key(entity),
            sink: None,
        })
    }
}

impl<T: IdEntity> Repository<T> {
    pub async fn get_by_id(&self, id: DbId) -> Result<Option<T>, DbError> {
        let mut rows = self
            .session
            .fetch_all::<T>(&select_by_key_sql::<T>(), &[SqlValue::from(id)])
            .await?;
        Ok(rows.pop())
    }
}
