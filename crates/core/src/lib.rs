//! Domain types shared by every Marquee crate.
//!
//! Nothing in here touches the database. The blob store lives here because
//! the catalog services and the HTTP layer both depend on it, while the
//! database crate does not.

pub mod cast;
pub mod error;
pub mod price;
pub mod search;
pub mod storage;
pub mod types;
