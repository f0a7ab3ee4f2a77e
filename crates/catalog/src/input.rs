//! Plain input records accepted by the services.
//!
//! Field-level validation (lengths, ranges, required fields) belongs to the
//! caller. The services only enforce referential and file invariants.

use chrono::NaiveDate;
use marquee_core::price::Price;
use marquee_core::storage::UploadedFile;
use marquee_core::types::{DbId, Timestamp};
use marquee_db::models::actor::Actor;
use marquee_db::models::category::Category;
use marquee_db::models::cinema::Cinema;
use marquee_db::models::movie::Movie;
use marquee_db::models::status::MovieStatus;

/// Everything needed to create or fully replace a movie.
#[derive(Debug, Clone)]
pub struct MovieInput {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub status: MovieStatus,
    pub release_date_time: Timestamp,
    pub duration_minutes: Option<i32>,
    pub category_id: DbId,
    pub cinema_id: DbId,
    /// Cast, in display order. Duplicates are collapsed.
    pub actor_ids: Vec<DbId>,
    /// New poster. `None` keeps the current one on update.
    pub poster: Option<UploadedFile>,
    /// Images appended to the gallery. Empty files are skipped.
    pub gallery: Vec<UploadedFile>,
}

impl MovieInput {
    /// The root row carrying this input's scalar fields.
    pub(crate) fn to_movie(&self, id: DbId, main_image: Option<String>) -> Movie {
        Movie {
            id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            status: self.status,
            release_date_time: self.release_date_time,
            duration_minutes: self.duration_minutes,
            main_image,
            category_id: self.category_id,
            cinema_id: self.cinema_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub image: Option<UploadedFile>,
}

impl CategoryInput {
    pub(crate) fn to_category(&self, id: DbId, image_url: Option<String>) -> Category {
        Category {
            id,
            name: self.name.clone(),
            image_url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CinemaInput {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub logo: Option<UploadedFile>,
}

impl CinemaInput {
    pub(crate) fn to_cinema(&self, id: DbId, logo: Option<String>) -> Cinema {
        Cinema {
            id,
            name: self.name.clone(),
            logo,
            description: self.description.clone(),
            address: self.address.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActorInput {
    pub name: String,
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<UploadedFile>,
}

impl ActorInput {
    pub(crate) fn to_actor(&self, id: DbId, profile_picture: Option<String>) -> Actor {
        Actor {
            id,
            name: self.name.clone(),
            profile_picture,
            bio: self.bio.clone(),
            date_of_birth: self.date_of_birth,
        }
    }
}
