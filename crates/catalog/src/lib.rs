//! Catalog services.
//!
//! [`MovieService`] keeps a movie and the rows and files it owns (cast
//! links, gallery images, poster) consistent across multi-step writes. The
//! category, cinema and actor services are thin single-table counterparts.
//!
//! Every public operation opens its own [`UnitOfWork`](marquee_db::UnitOfWork)
//! and disposes it before returning.

mod assets;
mod rows;

pub mod actor_service;
pub mod category_service;
pub mod cinema_service;
pub mod input;
pub mod movie_service;
pub mod outcome;
pub mod views;

pub use actor_service::ActorService;
pub use category_service::CategoryService;
pub use cinema_service::CinemaService;
pub use input::{ActorInput, CategoryInput, CinemaInput, MovieInput};
pub use movie_service::MovieService;
pub use outcome::{CatalogEvent, GalleryImageRemoval, Outcome};
pub use views::{CastMember, MovieDetails, MovieListing};
