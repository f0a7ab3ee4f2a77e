//! Shared response envelope types for API handlers.
//!
//! Reads answer `{ "data": ... }`. Mutations add the one-line `message` and
//! any superseded files that could not be removed.

use marquee_catalog::Outcome;
use marquee_core::storage::AssetCleanupFailure;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Envelope for a successful mutation.
#[derive(Debug, Serialize)]
pub struct OutcomeResponse<T: Serialize> {
    pub data: T,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphaned_assets: Vec<AssetCleanupFailure>,
}

impl<T: Serialize> From<Outcome<T>> for OutcomeResponse<T> {
    fn from(outcome: Outcome<T>) -> Self {
        Self {
            message: outcome.message(),
            data: outcome.value,
            orphaned_assets: outcome.orphaned_assets,
        }
    }
}
