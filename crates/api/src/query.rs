//! Query parameter types shared by handlers.

use marquee_core::types::DbId;
use serde::Deserialize;

/// Filters for `GET /movies`. All optional and combined with AND.
#[derive(Debug, Default, Deserialize)]
pub struct MovieFilter {
    pub category_id: Option<DbId>,
    pub cinema_id: Option<DbId>,
    /// Status name (`NowShowing`) or number (`2`).
    pub status: Option<String>,
    /// Free-text search on name and description.
    pub q: Option<String>,
}

/// `?count=` for top-N listings.
#[derive(Debug, Deserialize)]
pub struct TopParams {
    pub count: Option<u32>,
}
