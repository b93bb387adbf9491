//! devconnector/crates/domains/src/lib.rs
//!
//! The central domain logic and interface definitions for DevConnector.

pub mod error;
pub mod models;
pub mod policy;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;
