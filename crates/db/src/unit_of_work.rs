//! Unit of work: one logical operation's repositories, staged writes and
//! optional explicit transaction.
//!
//! Writes staged through any repository of a unit land in one shared list,
//! in staging order. [`UnitOfWork::save_changes`] flushes that list as a
//! single atomic batch.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Sqlite, SqliteConnection, Transaction};

use crate::entity::{bind_values, Entity, SqlValue};
use crate::models::actor::Actor;
use crate::models::cast_link::CastLink;
use crate::models::category::Category;
use crate::models::cinema::Cinema;
use crate::models::gallery_image::GalleryImage;
use crate::models::movie::Movie;
use crate::repository::Repository;
use crate::{DbError, DbPool};

// ---------------------------------------------------------------------------
// Staged writes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteKind {
    Insert,
    Update,
    Delete,
}

impl WriteKind {
    fn as_str(self) -> &'static str {
        match self {
            WriteKind::Insert => "INSERT",
            WriteKind::Update => "UPDATE",
            WriteKind::Delete => "DELETE",
        }
    }
}

/// Receives the stored row of an insert.
pub(crate) trait InsertSink: Send {
    /// Decode the `RETURNING` row. Called while the batch is in flight.
    fn accept(&mut self, row: &SqliteRow) -> Result<(), sqlx::Error>;

    /// Expose the decoded row. Called only once the batch has been saved.
    fn publish(self: Box<Self>);
}

pub(crate) struct PendingWrite {
    pub(crate) table: &'static str,
    pub(crate) kind: WriteKind,
    pub(crate) sql: String,
    pub(crate) params: Vec<SqlValue>,
    /// Rendered key, for stale-write errors.
    pub(crate) key: String,
    pub(crate) sink: Option<Box<dyn InsertSink>>,
}

/// Run a batch on `conn`, returning the number of affected rows.
async fn apply_batch(
    conn: &mut SqliteConnection,
    batch: &mut [PendingWrite],
) -> Result<u64, DbError> {
    let mut affected = 0;
    for write in batch.iter_mut() {
        let query = bind_values(sqlx::query(&write.sql), &write.params);
        match (write.kind, write.sink.as_mut()) {
            (WriteKind::Insert, Some(sink)) => {
                let row = query.fetch_one(&mut *conn).await?;
                sink.accept(&row)?;
                affected += 1;
            }
            (kind, _) => {
                let rows = query.execute(&mut *conn).await?.rows_affected();
                if rows == 0 && kind != WriteKind::Insert {
                    return Err(DbError::StaleEntity {
                        table: write.table,
                        operation: kind.as_str(),
                        key: write.key.clone(),
                    });
                }
                affected += rows;
            }
        }
    }
    Ok(affected)
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// State shared by a unit of work and its repositories.
pub(crate) struct Session {
    pool: DbPool,
    transaction: tokio::sync::Mutex<Option<Transaction<'static, Sqlite>>>,
    pending: Mutex<Vec<PendingWrite>>,
    disposed: AtomicBool,
}

impl Session {
    fn new(pool: DbPool) -> Self {
        Self {
            pool,
            transaction: tokio::sync::Mutex::new(None),
            pending: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
        }
    }

    pub(crate) fn ensure_active(&self) -> Result<(), DbError> {
        if self.disposed.load(Ordering::Acquire) {
            Err(DbError::Disposed)
        } else {
            Ok(())
        }
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Vec<PendingWrite>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn stage(&self, write: PendingWrite) -> Result<(), DbError> {
        self.ensure_active()?;
        self.pending().push(write);
        Ok(())
    }

    fn take_pending(&self) -> Vec<PendingWrite> {
        std::mem::take(&mut *self.pending())
    }

    pub(crate) async fn fetch_all<T: Entity>(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Vec<T>, DbError> {
        self.ensure_active()?;
        let query = bind_values(sqlx::query(sql), params);
        let mut transaction = self.transaction.lock().await;
        let rows = match transaction.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await?,
            None => query.fetch_all(&self.pool).await?,
        };
        rows.iter()
            .map(|row| T::from_row(row).map_err(DbError::from))
            .collect()
    }

    pub(crate) async fn fetch_count(&self, sql: &str) -> Result<i64, DbError> {
        self.ensure_active()?;
        let query = sqlx::query_scalar::<_, i64>(sql);
        let mut transaction = self.transaction.lock().await;
        let count = match transaction.as_mut() {
            Some(tx) => query.fetch_one(&mut **tx).await?,
            None => query.fetch_one(&self.pool).await?,
        };
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Unit of work
// ---------------------------------------------------------------------------

/// Scope for one logical operation.
///
/// Dropping a unit with an open transaction rolls it back.
pub struct UnitOfWork {
    session: Arc<Session>,
    repositories: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl UnitOfWork {
    pub fn new(pool: DbPool) -> Self {
        Self {
            session: Arc::new(Session::new(pool)),
            repositories: Mutex::new(HashMap::new()),
        }
    }

    /// The repository for `T`, created on first use and reused afterwards.
    pub fn repository<T: Entity>(&self) -> Result<Arc<Repository<T>>, DbError> {
        self.session.ensure_active()?;
        let mut repositories = self
            .repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = repositories.get(&TypeId::of::<T>()) {
            if let Ok(repository) = Arc::clone(existing).downcast::<Repository<T>>() {
                return Ok(repository);
            }
        }

        let repository = Arc::new(Repository::<T>::new(Arc::clone(&self.session)));
        repositories.insert(TypeId::of::<T>(), repository.clone());
        Ok(repository)
    }

    pub fn movies(&self) -> Result<Arc<Repository<Movie>>, DbError> {
        self.repository()
    }

    pub fn categories(&self) -> Result<Arc<Repository<Category>>, DbError> {
        self.repository()
    }

    pub fn cinemas(&self) -> Result<Arc<Repository<Cinema>>, DbError> {
        self.repository()
    }

    pub fn actors(&self) -> Result<Arc<Repository<Actor>>, DbError> {
        self.repository()
    }

    pub fn cast_links(&self) -> Result<Arc<Repository<CastLink>>, DbError> {
        self.repository()
    }

    pub fn gallery_images(&self) -> Result<Arc<Repository<GalleryImage>>, DbError> {
        self.repository()
    }

    /// Number of writes staged since the last save.
    pub fn pending_changes(&self) -> usize {
        self.session.pending().len()
    }

    pub async fn in_transaction(&self) -> bool {
        self.session.transaction.lock().await.is_some()
    }

    /// Flush every staged write as one atomic batch.
    ///
    /// Inside an explicit transaction the batch runs under a savepoint, so a
    /// failure leaves the transaction as it was before the call. A failed
    /// batch is discarded either way.
    pub async fn save_changes(&self) -> Result<u64, DbError> {
        self.session.ensure_active()?;
        let mut batch = self.session.take_pending();
        if batch.is_empty() {
            return Ok(0);
        }

        let mut transaction = self.session.transaction.lock().await;
        let affected = match transaction.as_mut() {
            Some(outer) => {
                let mut savepoint = sqlx::Connection::begin(&mut **outer).await?;
                match apply_batch(&mut savepoint, &mut batch).await {
                    Ok(affected) => {
                        savepoint.commit().await?;
                        affected
                    }
                    Err(err) => {
                        if let Err(rollback_err) = savepoint.rollback().await {
                            tracing::warn!(error = %rollback_err, "Savepoint rollback failed");
                        }
                        return Err(err);
                    }
                }
            }
            None => {
                let mut tx = self.session.pool.begin().await?;
                match apply_batch(&mut tx, &mut batch).await {
                    Ok(affected) => {
                        tx.commit().await?;
                        affected
                    }
                    Err(err) => {
                        if let Err(rollback_err) = tx.rollback().await {
                            tracing::warn!(error = %rollback_err, "Batch rollback failed");
                        }
                        return Err(err);
                    }
                }
            }
        };
        drop(transaction);

        for sink in batch.into_iter().filter_map(|write| write.sink) {
            sink.publish();
        }
        tracing::debug!(affected, "Saved staged changes");
        Ok(affected)
    }

    /// Open an explicit transaction. Later reads and saves run inside it.
    pub async fn begin_transaction(&self) -> Result<(), DbError> {
        self.session.ensure_active()?;
        let mut transaction = self.session.transaction.lock().await;
        if transaction.is_some() {
            return Err(DbError::TransactionAlreadyOpen);
        }
        *transaction = Some(self.session.pool.begin().await?);
        Ok(())
    }

    /// Save staged writes and commit the explicit transaction.
    ///
    /// Without an open transaction this is [`Self::save_changes`]. On any
    /// failure the transaction is rolled back and the error returned.
    pub async fn commit(&self) -> Result<(), DbError> {
        if !self.in_transaction().await {
            return self.save_changes().await.map(|_| ());
        }

        if let Err(err) = self.save_changes().await {
            self.rollback().await?;
            return Err(err);
        }

        let Some(tx) = self.session.transaction.lock().await.take() else {
            return Ok(());
        };
        tx.commit().await?;
        Ok(())
    }

    /// Drop staged writes and roll back the explicit transaction, if any.
    ///
    /// A no-op on a disposed unit.
    pub async fn rollback(&self) -> Result<(), DbError> {
        if self.session.disposed.load(Ordering::Acquire) {
            return Ok(());
        }
        self.session.take_pending();
        let tx = self.session.transaction.lock().await.take();
        if let Some(tx) = tx {
            tx.rollback().await?;
        }
        Ok(())
    }

    /// Release the unit. Rolls back an open transaction and drops staged
    /// writes. Safe to call more than once.
    pub async fn dispose(&self) {
        if self.session.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let dropped = self.session.take_pending().len();
        if dropped > 0 {
            tracing::debug!(dropped, "Disposed unit of work with unsaved changes");
        }
        let tx = self.session.transaction.lock().await.take();
        if let Some(tx) = tx {
            if let Err(err) = tx.rollback().await {
                tracing::warn!(error = %err, "Rollback on dispose failed");
            }
        }
        self.repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.session.disposed.load(Ordering::Acquire)
    }
}
