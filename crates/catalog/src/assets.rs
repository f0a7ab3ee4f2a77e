//! File handling shared by the services.
//!
//! Uploads the caller asked for are required: their failure aborts the
//! operation. Deletes of superseded files are best effort: their failure is
//! logged and reported, never raised.

use marquee_core::error::CoreError;
use marquee_core::storage::{AssetCleanupFailure, BlobStore, UploadedFile};

/// Delete `reference` if set, reporting a failure instead of raising it.
pub(crate) async fn discard<B: BlobStore>(
    blobs: &B,
    reference: Option<&str>,
) -> Option<AssetCleanupFailure> {
    let reference = reference.filter(|r| !r.trim().is_empty())?;
    match blobs.delete(reference).await {
        Ok(()) => None,
        Err(err) => {
            tracing::warn!(reference, error = %err, "Could not delete superseded file");
            Some(AssetCleanupFailure {
                reference: reference.to_string(),
                reason: err.to_string(),
            })
        }
    }
}

/// Delete every reference, logging each failure.
pub(crate) async fn discard_all<B: BlobStore>(
    blobs: &B,
    references: &[String],
) -> Vec<AssetCleanupFailure> {
    let failures = blobs.delete_many(references).await;
    for failure in &failures {
        tracing::warn!(
            reference = %failure.reference,
            error = %failure.reason,
            "Could not delete superseded file"
        );
    }
    failures
}

/// Swap `current` for a fresh upload of `replacement`.
///
/// Without a replacement the current reference is kept. Otherwise the old
/// file is deleted first (best effort, failures land in `orphaned`) and the
/// new one uploaded (fatal on failure).
pub(crate) async fn replace<B: BlobStore>(
    blobs: &B,
    current: Option<String>,
    replacement: Option<&UploadedFile>,
    folder: &str,
    orphaned: &mut Vec<AssetCleanupFailure>,
) -> Result<Option<String>, CoreError> {
    let Some(file) = replacement else {
        return Ok(current);
    };
    orphaned.extend(discard(blobs, current.as_deref()).await);
    let reference = blobs.upload(file, folder).await?;
    Ok(Some(reference))
}

/// Upload an optional file. `None` in, `None` out.
pub(crate) async fn upload_optional<B: BlobStore>(
    blobs: &B,
    file: Option<&UploadedFile>,
    folder: &str,
) -> Result<Option<String>, CoreError> {
    match file {
        Some(file) => Ok(Some(blobs.upload(file, folder).await?)),
        None => Ok(None),
    }
}

/// Note files written by an operation that then failed. They are left in
/// place; nothing reconciles them later.
pub(crate) fn report_orphaned_uploads(operation: &str, references: &[String]) {
    if !references.is_empty() {
        tracing::warn!(
            operation,
            orphans = ?references,
            "Operation failed after uploading files; files left in place"
        );
    }
}
