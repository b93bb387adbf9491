//! # auth-adapters
//!
//! Argon2 password hashing and (with `auth-jwt`) signed bearer tokens.

#[cfg(feature = "auth-jwt")]
pub mod jwt;
pub mod password;

use thiserror::Error;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenService;
pub use password::Argon2PasswordHasher;

/// Construction-time failures of the auth adapters.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("jwt secret must not be empty")]
    EmptySecret,

    #[error("token lifetime of {0}s is out of range")]
    InvalidTtl(u64),
}
