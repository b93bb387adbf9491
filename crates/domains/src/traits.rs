//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Repositories behave like a document store: by-id lookup and
//! whole-document rewrite. Rewrites of existing aggregates are conditional on
//! the `version` the caller loaded.

use async_trait::async_trait;

use crate::error::{AppError, RepoError};
use crate::models::{AuthToken, Post, PostId, Profile, User, UserId};

/// Identity store.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `RepoError::Duplicate` when the email is taken.
    async fn insert(&self, user: &User) -> Result<(), RepoError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: UserId) -> Result<bool, RepoError>;
}

/// Profile documents, keyed by their owner.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user: UserId) -> Result<Option<Profile>, RepoError>;
    async fn list(&self) -> Result<Vec<Profile>, RepoError>;
    /// Fails with `RepoError::Duplicate` when the owner already has a profile.
    async fn insert(&self, profile: &Profile) -> Result<(), RepoError>;
    /// Rewrites the stored document if its version still equals
    /// `profile.version`; returns the stored document with the bumped version.
    async fn update(&self, profile: &Profile) -> Result<Profile, RepoError>;
    async fn delete_by_user(&self, user: UserId) -> Result<bool, RepoError>;
}

/// Post documents.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<(), RepoError>;
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError>;
    /// All posts, newest first.
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError>;
    /// Same contract as [`ProfileRepository::update`].
    async fn update(&self, post: &Post) -> Result<Post, RepoError>;
    async fn delete(&self, id: PostId) -> Result<bool, RepoError>;
}

/// Credential hashing primitive.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AppError>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Signed-token primitive. Verification yields the authenticated identity.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, user: UserId) -> Result<AuthToken, AppError>;
    fn verify(&self, token: &str) -> Result<UserId, AppError>;
}
