//! Persistence layer: SQLite pool helpers, row models, the generic
//! [`Repository`](repository::Repository) and the
//! [`UnitOfWork`](unit_of_work::UnitOfWork) that batches their writes.

use std::str::FromStr;
use std::time::Duration;

use marquee_core::error::{CoreError, CONSTRAINT_VIOLATION};
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub mod entity;
pub mod models;
pub mod repositories;
pub mod repository;
pub mod unit_of_work;

pub use repository::{Repository, Staged};
pub use unit_of_work::UnitOfWork;

pub type DbPool = sqlx::SqlitePool;

/// Connection cap for file-backed databases.
const MAX_CONNECTIONS: u32 = 8;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a connection pool from a database URL.
///
/// In-memory databases are private to a connection, so they get a pool of
/// exactly one.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let max_connections = if database_url.contains(":memory:") {
        1
    } else {
        MAX_CONNECTIONS
    };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Errors raised by repositories and the unit of work.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Expected at most one {entity}, found {count}")]
    AmbiguousResult { entity: &'static str, count: usize },

    /// An update or delete matched no row: the row was removed or never existed.
    #[error("{operation} on {table} matched no row for key ({key})")]
    StaleEntity {
        table: &'static str,
        operation: &'static str,
        key: String,
    },

    #[error("A transaction is already open on this unit of work")]
    TransactionAlreadyOpen,

    #[error("The unit of work has been disposed")]
    Disposed,
}

impl DbError {
    /// Whether the store rejected a write because of a constraint
    /// (foreign key, unique, not-null or check).
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            DbError::Sqlx(sqlx::Error::Database(db_err)) => matches!(
                db_err.kind(),
                ErrorKind::ForeignKeyViolation
                    | ErrorKind::UniqueViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation
            ),
            _ => false,
        }
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::AmbiguousResult { entity, count } => {
                CoreError::AmbiguousResult { entity, count }
            }
            DbError::Disposed | DbError::TransactionAlreadyOpen => {
                CoreError::Internal(err.to_string())
            }
            ref e if e.is_constraint_violation() => {
                CoreError::Persistence(format!("{CONSTRAINT_VIOLATION}: {e}"))
            }
            DbError::Sqlx(_) | DbError::StaleEntity { .. } => {
                CoreError::Persistence(err.to_string())
            }
        }
    }
}
