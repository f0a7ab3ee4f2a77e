pub mod actors;
pub mod categories;
pub mod cinemas;
pub mod dashboard;
pub mod movies;
