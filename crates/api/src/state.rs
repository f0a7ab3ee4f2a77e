use std::sync::Arc;

use marquee_catalog::{ActorService, CategoryService, CinemaService, MovieService};
use marquee_core::storage::LocalBlobStore;
use marquee_db::DbPool;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool and the services share their inner data.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    pub movies: MovieService<LocalBlobStore>,
    pub categories: CategoryService<LocalBlobStore>,
    pub cinemas: CinemaService<LocalBlobStore>,
    pub actors: ActorService<LocalBlobStore>,
}

impl AppState {
    /// Wire the services to `pool` and a blob store rooted at the
    /// configured upload root.
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        let blobs = Arc::new(LocalBlobStore::new(config.upload_root.clone()));
        Self {
            movies: MovieService::new(pool.clone(), Arc::clone(&blobs)),
            categories: CategoryService::new(pool.clone(), Arc::clone(&blobs)),
            cinemas: CinemaService::new(pool.clone(), Arc::clone(&blobs)),
            actors: ActorService::new(pool.clone(), blobs),
            pool,
            config: Arc::new(config),
        }
    }
}
