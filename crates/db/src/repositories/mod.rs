//! Repository layer for read-only reporting.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&DbPool` as the first argument. Entity writes go through
//! [`UnitOfWork`](crate::UnitOfWork) instead.

pub mod analytics_repo;

pub use analytics_repo::AnalyticsRepo;
