//! Blob storage for uploaded images (posters, gallery shots, logos).
//!
//! Files are addressed by a relative reference string such as
//! `uploads/movies/7c9e..._poster.png`. References are what entities store;
//! they stay valid as long as the file is not deleted. Blob operations never
//! take part in a database transaction.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Top-level directory (under the storage root) that holds every upload.
pub const UPLOADS_DIR: &str = "uploads";

/// Folder for movie posters.
pub const MOVIE_POSTER_FOLDER: &str = "movies";

/// Folder for movie gallery images.
pub const MOVIE_GALLERY_FOLDER: &str = "movies/gallery";

/// Folder for category cover images.
pub const CATEGORY_FOLDER: &str = "categories";

/// Folder for cinema logos.
pub const CINEMA_FOLDER: &str = "cinemas";

/// Folder for actor profile pictures.
pub const ACTOR_FOLDER: &str = "actors";

/// Longest sanitized original file name kept in a generated name.
const MAX_ORIGINAL_NAME_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An uploaded file payload as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Name supplied by the client; only used as a readable suffix.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// A best-effort delete that did not succeed. The file is left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetCleanupFailure {
    pub reference: String,
    pub reason: String,
}

/// Errors raised by blob operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Uploaded file '{0}' is empty")]
    EmptyPayload(String),

    #[error("Invalid upload folder '{0}'")]
    InvalidFolder(String),

    #[error("Invalid asset reference '{0}'")]
    InvalidReference(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<BlobError> for CoreError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::EmptyPayload(_)
            | BlobError::InvalidFolder(_)
            | BlobError::InvalidReference(_) => CoreError::InvalidInput(err.to_string()),
            BlobError::Io { .. } => CoreError::AssetOperation(err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Storage backend for binary assets.
///
/// Implementations must make `delete` idempotent: deleting an empty or
/// already-absent reference succeeds.
pub trait BlobStore: Send + Sync {
    /// Store `file` under `folder` and return its reference.
    ///
    /// Every call produces a fresh reference, even for identical content.
    fn upload(
        &self,
        file: &UploadedFile,
        folder: &str,
    ) -> impl Future<Output = Result<String, BlobError>> + Send;

    /// Remove the file behind `reference`, if any.
    fn delete(&self, reference: &str) -> impl Future<Output = Result<(), BlobError>> + Send;

    /// Whether `reference` currently resolves to a stored file.
    fn exists(&self, reference: &str) -> impl Future<Output = bool> + Send;

    /// Upload every non-empty file in order. Empty files are skipped; the
    /// first hard failure aborts the remaining uploads.
    fn upload_many(
        &self,
        files: &[UploadedFile],
        folder: &str,
    ) -> impl Future<Output = Result<Vec<String>, BlobError>> + Send {
        async move {
            let mut references = Vec::with_capacity(files.len());
            for file in files.iter().filter(|f| !f.is_empty()) {
                references.push(self.upload(file, folder).await?);
            }
            Ok(references)
        }
    }

    /// Delete every reference, collecting failures instead of stopping.
    fn delete_many(
        &self,
        references: &[String],
    ) -> impl Future<Output = Vec<AssetCleanupFailure>> + Send {
        async move {
            let mut failures = Vec::new();
            for reference in references {
                if let Err(err) = self.delete(reference).await {
                    failures.push(AssetCleanupFailure {
                        reference: reference.clone(),
                        reason: err.to_string(),
                    });
                }
            }
            failures
        }
    }
}

// ---------------------------------------------------------------------------
// Local filesystem backend
// ---------------------------------------------------------------------------

/// Stores blobs on the local filesystem below `root/uploads`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// `root` is the directory that references are resolved against
    /// (the web root when files are served statically).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a reference to an absolute path, rejecting anything that
    /// would escape the uploads directory.
    fn resolve(&self, reference: &str) -> Result<PathBuf, BlobError> {
        let invalid = || BlobError::InvalidReference(reference.to_string());
        let path = Path::new(reference);

        let mut components = path.components();
        match components.next() {
            Some(Component::Normal(first)) if first == UPLOADS_DIR => {}
            _ => return Err(invalid()),
        }
        let mut depth = 0;
        for component in components {
            match component {
                Component::Normal(_) => depth += 1,
                _ => return Err(invalid()),
            }
        }
        if depth == 0 {
            return Err(invalid());
        }

        Ok(self.root.join(path))
    }
}

impl BlobStore for LocalBlobStore {
    async fn upload(&self, file: &UploadedFile, folder: &str) -> Result<String, BlobError> {
        if file.is_empty() {
            return Err(BlobError::EmptyPayload(file.file_name.clone()));
        }
        validate_folder(folder)?;

        let relative_dir = format!("{UPLOADS_DIR}/{folder}");
        let dir = self.root.join(&relative_dir);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| BlobError::Io {
                path: relative_dir.clone(),
                source,
            })?;

        let stored_name = unique_file_name(&file.file_name);
        let reference = format!("{relative_dir}/{stored_name}");
        tokio::fs::write(dir.join(&stored_name), &file.bytes)
            .await
            .map_err(|source| BlobError::Io {
                path: reference.clone(),
                source,
            })?;

        Ok(reference)
    }

    async fn delete(&self, reference: &str) -> Result<(), BlobError> {
        if reference.trim().is_empty() {
            return Ok(());
        }
        let path = self.resolve(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(BlobError::Io {
                path: reference.to_string(),
                source,
            }),
        }
    }

    async fn exists(&self, reference: &str) -> bool {
        let Ok(path) = self.resolve(reference) else {
            return false;
        };
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A folder is one or more `/`-separated segments of `[A-Za-z0-9_-]`.
pub fn validate_folder(folder: &str) -> Result<(), BlobError> {
    let valid = !folder.is_empty()
        && folder.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        });
    if valid {
        Ok(())
    } else {
        Err(BlobError::InvalidFolder(folder.to_string()))
    }
}

/// `<uuid>_<sanitized original name>`.
fn unique_file_name(original: &str) -> String {
    format!("{}_{}", uuid::Uuid::new_v4(), sanitize_file_name(original))
}

/// Keep the last path segment and replace anything outside
/// `[A-Za-z0-9._-]` with `_`.
fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_ORIGINAL_NAME_LEN)
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
