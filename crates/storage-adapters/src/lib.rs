//! # storage-adapters
//!
//! Document-store implementations of the repository ports.
//! The in-memory store is always compiled; PostgreSQL sits behind the
//! `db-postgres` feature.

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::{InMemoryPostRepository, InMemoryProfileRepository, InMemoryUserRepository};
