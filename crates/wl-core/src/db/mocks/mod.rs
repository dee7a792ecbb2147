//! Mock implementations of repository traits for testing.
//!
//! These mocks use in-memory storage and do not require a database connection.
//! They are useful for unit testing components that depend on repositories.

mod waifu_repo;

pub use waifu_repo::MockWaifuRepository;
