//! Marquee API server library.
//!
//! Exposes config, state, error handling, form parsing and routes so
//! integration tests and the binary entrypoint can both build the app.

pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
