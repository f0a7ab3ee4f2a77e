//! Row models.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching one
//! table, and its [`Entity`](crate::entity::Entity) description.

pub mod actor;
pub mod analytics;
pub mod cast_link;
pub mod category;
pub mod cinema;
pub mod gallery_image;
pub mod movie;
pub mod status;
