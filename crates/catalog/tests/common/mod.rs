//! Shared fixtures for the catalog service tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use marquee_catalog::{
    ActorInput, ActorService, CategoryInput, CategoryService, CinemaInput, CinemaService,
    MovieInput, MovieService,
};
use marquee_core::price::Price;
use marquee_core::storage::{
    BlobError, BlobStore, LocalBlobStore, UploadedFile, MOVIE_GALLERY_FOLDER, UPLOADS_DIR,
};
use marquee_core::types::DbId;
use marquee_db::models::status::MovieStatus;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tokio::sync::Notify;

// ---------------------------------------------------------------------------
// Failure-injecting blob store
// ---------------------------------------------------------------------------

/// A local blob store whose uploads and deletes can be made to fail, and
/// whose gallery uploads can be held open.
pub struct FlakyBlobStore {
    inner: LocalBlobStore,
    uploads: AtomicUsize,
    fail_upload_at: AtomicUsize,
    fail_deletes: AtomicBool,
    delete_attempts: Mutex<Vec<String>>,
    gallery_gate: Mutex<Option<Arc<UploadGate>>>,
}

/// Pauses an upload: `entered` fires once the upload starts, and the upload
/// waits for `release` before writing.
#[derive(Default)]
pub struct UploadGate {
    pub entered: Notify,
    pub release: Notify,
}

impl FlakyBlobStore {
    pub fn new(root: &std::path::Path) -> Self {
        Self {
            inner: LocalBlobStore::new(root),
            uploads: AtomicUsize::new(0),
            fail_upload_at: AtomicUsize::new(usize::MAX),
            fail_deletes: AtomicBool::new(false),
            delete_attempts: Mutex::new(Vec::new()),
            gallery_gate: Mutex::new(None),
        }
    }

    /// Hold every later gallery upload at the returned gate.
    pub fn hold_gallery_uploads(&self) -> Arc<UploadGate> {
        let gate = Arc::new(UploadGate::default());
        *self.gallery_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Let `successes` more uploads through, then fail every later one.
    pub fn fail_uploads_after(&self, successes: usize) {
        let done = self.uploads.load(Ordering::SeqCst);
        self.fail_upload_at.store(done + successes, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Every reference passed to `delete`, in call order.
    pub fn delete_attempts(&self) -> Vec<String> {
        self.delete_attempts.lock().unwrap().clone()
    }
}

impl BlobStore for FlakyBlobStore {
    async fn upload(&self, file: &UploadedFile, folder: &str) -> Result<String, BlobError> {
        let attempt = self.uploads.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.fail_upload_at.load(Ordering::SeqCst) {
            return Err(BlobError::Io {
                path: folder.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        let gate = if folder == MOVIE_GALLERY_FOLDER {
            self.gallery_gate.lock().unwrap().clone()
        } else {
            None
        };
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.inner.upload(file, folder).await
    }

    async fn delete(&self, reference: &str) -> Result<(), BlobError> {
        self.delete_attempts
            .lock()
            .unwrap()
            .push(reference.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BlobError::Io {
                path: reference.to_string(),
                source: std::io::Error::other("permission denied"),
            });
        }
        self.inner.delete(reference).await
    }

    async fn exists(&self, reference: &str) -> bool {
        self.inner.exists(reference).await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub pool: SqlitePool,
    pub blobs: Arc<FlakyBlobStore>,
    pub movies: MovieService<FlakyBlobStore>,
    pub categories: CategoryService<FlakyBlobStore>,
    pub cinemas: CinemaService<FlakyBlobStore>,
    pub actors: ActorService<FlakyBlobStore>,
    pub root: TempDir,
}

pub fn harness(pool: SqlitePool) -> Harness {
    let root = tempfile::tempdir().expect("create blob root");
    let blobs = Arc::new(FlakyBlobStore::new(root.path()));
    Harness {
        movies: MovieService::new(pool.clone(), Arc::clone(&blobs)),
        categories: CategoryService::new(pool.clone(), Arc::clone(&blobs)),
        cinemas: CinemaService::new(pool.clone(), Arc::clone(&blobs)),
        actors: ActorService::new(pool.clone(), Arc::clone(&blobs)),
        pool,
        blobs,
        root,
    }
}

/// Categories 1..=3, cinema 1 and actors 1..=3 in a fresh database.
pub async fn seed_catalog(h: &Harness) {
    for name in ["Action", "Comedy", "Drama"] {
        h.categories
            .create(CategoryInput {
                name: name.to_string(),
                image: None,
            })
            .await
            .expect("seed category");
    }
    h.cinemas
        .create(CinemaInput {
            name: "Roxy".to_string(),
            description: None,
            address: Some("1 Main St".to_string()),
            logo: None,
        })
        .await
        .expect("seed cinema");
    for name in ["Ada Lane", "Ben Park", "Cy Moss"] {
        h.actors
            .create(ActorInput {
                name: name.to_string(),
                bio: None,
                date_of_birth: None,
                profile_picture: None,
            })
            .await
            .expect("seed actor");
    }
}

pub fn png(name: &str) -> UploadedFile {
    UploadedFile::new(name, vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a])
}

pub fn movie_input(category_id: DbId, cinema_id: DbId, actor_ids: &[DbId]) -> MovieInput {
    MovieInput {
        name: "The Long Night".to_string(),
        description: "A lighthouse keeper waits for dawn.".to_string(),
        price: Price::from_units(75),
        status: MovieStatus::NowShowing,
        release_date_time: Utc.with_ymd_and_hms(2025, 10, 14, 19, 30, 0).unwrap(),
        duration_minutes: Some(118),
        category_id,
        cinema_id,
        actor_ids: actor_ids.to_vec(),
        poster: None,
        gallery: Vec::new(),
    }
}

/// Number of files stored directly under `uploads/<folder>`.
pub fn stored_files(h: &Harness, folder: &str) -> usize {
    let dir = h.root.path().join(UPLOADS_DIR).join(folder);
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .count(),
        Err(_) => 0,
    }
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count rows")
}
