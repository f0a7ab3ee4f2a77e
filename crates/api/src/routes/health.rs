//! `GET /health`: can the service read its catalog and store uploads.

use std::path::Path;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` when every check passes, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// The upload root is an existing, writable directory.
    pub storage_healthy: bool,
}

impl HealthReport {
    fn new(db_healthy: bool, storage_healthy: bool) -> Self {
        Self {
            status: if db_healthy && storage_healthy {
                "ok"
            } else {
                "degraded"
            },
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            storage_healthy,
        }
    }
}

async fn upload_root_usable(root: &Path) -> bool {
    match tokio::fs::metadata(root).await {
        Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
        Err(err) => {
            tracing::warn!(root = %root.display(), error = %err, "Upload root unavailable");
            false
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let db_healthy = match marquee_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Database health check failed");
            false
        }
    };
    let storage_healthy = upload_root_usable(&state.config.upload_root).await;
    Json(HealthReport::new(db_healthy, storage_healthy))
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_failed_check_degrades_the_report() {
        assert_eq!(HealthReport::new(true, true).status, "ok");
        assert_eq!(HealthReport::new(false, true).status, "degraded");
        assert_eq!(HealthReport::new(true, false).status, "degraded");
    }

    #[tokio::test]
    async fn missing_upload_root_is_unusable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(upload_root_usable(dir.path()).await);
        assert!(!upload_root_usable(&dir.path().join("absent")).await);
    }
}
