//! Results of catalog mutations.
//!
//! A mutation returns its value together with a [`CatalogEvent`] describing
//! what happened and any superseded files that could not be removed. The
//! caller decides how to present them.

use marquee_core::storage::AssetCleanupFailure;
use marquee_core::types::DbId;
use serde::Serialize;

/// What a successful mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogEvent {
    Created { entity: &'static str, id: DbId },
    Updated { entity: &'static str, id: DbId },
    Deleted { entity: &'static str, id: DbId },
}

impl CatalogEvent {
    pub fn id(&self) -> DbId {
        match self {
            CatalogEvent::Created { id, .. }
            | CatalogEvent::Updated { id, .. }
            | CatalogEvent::Deleted { id, .. } => *id,
        }
    }
}

/// A successful mutation.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub event: CatalogEvent,
    /// Best-effort deletes that failed. The files are still on disk.
    pub orphaned_assets: Vec<AssetCleanupFailure>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, event: CatalogEvent) -> Self {
        Self {
            value,
            event,
            orphaned_assets: Vec::new(),
        }
    }

    pub fn with_orphans(mut self, orphaned_assets: Vec<AssetCleanupFailure>) -> Self {
        self.orphaned_assets = orphaned_assets;
        self
    }

    /// One-line feedback, e.g. `Movie #7 updated (1 old file could not be removed)`.
    pub fn message(&self) -> String {
        let base = match self.event {
            CatalogEvent::Created { entity, id } => format!("{entity} #{id} created"),
            CatalogEvent::Updated { entity, id } => format!("{entity} #{id} updated"),
            CatalogEvent::Deleted { entity, id } => format!("{entity} #{id} deleted"),
        };
        match self.orphaned_assets.len() {
            0 => base,
            1 => format!("{base} (1 old file could not be removed)"),
            n => format!("{base} ({n} old files could not be removed)"),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            event: self.event,
            orphaned_assets: self.orphaned_assets,
        }
    }
}

/// Result of removing one gallery image. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GalleryImageRemoval {
    Removed {
        image_id: DbId,
        movie_id: DbId,
        /// Set when the row is gone but its file could not be deleted.
        orphaned_asset: Option<AssetCleanupFailure>,
    },
    NotFound,
    Failed {
        reason: String,
    },
}

impl GalleryImageRemoval {
    pub fn is_success(&self) -> bool {
        matches!(self, GalleryImageRemoval::Removed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_entity_and_id() {
        let outcome = Outcome::new(
            (),
            CatalogEvent::Created {
                entity: "Movie",
                id: 7,
            },
        );
        assert_eq!(outcome.message(), "Movie #7 created");
    }

    #[test]
    fn message_mentions_orphaned_files() {
        let orphan = AssetCleanupFailure {
            reference: "uploads/movies/a.png".into(),
            reason: "permission denied".into(),
        };
        let outcome = Outcome::new(
            (),
            CatalogEvent::Deleted {
                entity: "Movie",
                id: 3,
            },
        )
        .with_orphans(vec![orphan.clone(), orphan]);
        assert_eq!(
            outcome.message(),
            "Movie #3 deleted (2 old files could not be removed)"
        );
    }

    #[test]
    fn only_removed_counts_as_success() {
        assert!(GalleryImageRemoval::Removed {
            image_id: 1,
            movie_id: 2,
            orphaned_asset: None
        }
        .is_success());
        assert!(!GalleryImageRemoval::NotFound.is_success());
        assert!(!GalleryImageRemoval::Failed {
            reason: "x".into()
        }
        .is_success());
    }
}
