//! Read models with their associations resolved.

use marquee_core::types::DbId;
use marquee_db::models::actor::Actor;
use marquee_db::models::category::Category;
use marquee_db::models::cinema::Cinema;
use marquee_db::models::gallery_image::GalleryImage;
use marquee_db::models::movie::Movie;
use serde::Serialize;

/// An actor as shown in a movie's cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CastMember {
    pub actor_id: DbId,
    pub name: String,
    pub profile_picture: Option<String>,
}

impl From<&Actor> for CastMember {
    fn from(actor: &Actor) -> Self {
        Self {
            actor_id: actor.id,
            name: actor.name.clone(),
            profile_picture: actor.profile_picture.clone(),
        }
    }
}

/// A movie with category, cinema and cast, as listed.
#[derive(Debug, Clone, Serialize)]
pub struct MovieListing {
    #[serde(flatten)]
    pub movie: Movie,
    pub category: Option<Category>,
    pub cinema: Option<Cinema>,
    pub cast: Vec<CastMember>,
}

/// A movie with every association, gallery in display order.
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    pub category: Option<Category>,
    pub cinema: Option<Cinema>,
    pub cast: Vec<CastMember>,
    pub gallery: Vec<GalleryImage>,
}

impl MovieDetails {
    pub fn cast_ids(&self) -> Vec<DbId> {
        self.cast.iter().map(|member| member.actor_id).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: Category,
    pub movie_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithMovies {
    #[serde(flatten)]
    pub category: Category,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CinemaSummary {
    #[serde(flatten)]
    pub cinema: Cinema,
    pub movie_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CinemaWithMovies {
    #[serde(flatten)]
    pub cinema: Cinema,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActorSummary {
    #[serde(flatten)]
    pub actor: Actor,
    pub movie_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActorWithMovies {
    #[serde(flatten)]
    pub actor: Actor,
    pub movies: Vec<Movie>,
}
