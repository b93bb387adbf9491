//! # In-memory document store
//!
//! DashMap-backed repositories used for development and tests. Version
//! checks run while the shard lock for the document is held, so a stale
//! rewrite can never overwrite a newer one.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{
    Post, PostId, PostRepository, Profile, ProfileRepository, RepoError, User, UserId,
    UserRepository,
};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<DashMap<UserId, User>>,
    /// email -> id, enforces uniqueness
    emails: Arc<DashMap<String, UserId>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepoError> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(RepoError::Duplicate {
                entity: "user",
                key: user.email.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let Some(id) = self.emails.get(email).map(|id| *id.value()) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepoError> {
        match self.users.remove(&id) {
            Some((_, user)) => {
                self.emails.remove(&user.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Profiles keyed by owner, which makes the one-profile-per-user rule a
/// property of the map itself.
#[derive(Clone, Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<DashMap<UserId, Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_user(&self, user: UserId) -> Result<Option<Profile>, RepoError> {
        Ok(self.profiles.get(&user).map(|p| p.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Profile>, RepoError> {
        let mut all: Vec<Profile> = self.profiles.iter().map(|p| p.value().clone()).collect();
        all.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(all)
    }

    async fn insert(&self, profile: &Profile) -> Result<(), RepoError> {
        match self.profiles.entry(profile.user) {
            Entry::Occupied(_) => Err(RepoError::Duplicate {
                entity: "profile",
                key: profile.user.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(profile.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, profile: &Profile) -> Result<Profile, RepoError> {
        let mut stored = self
            .profiles
            .get_mut(&profile.user)
            .ok_or_else(|| RepoError::NotFound {
                entity: "profile",
                id: profile.id.to_string(),
            })?;
        if stored.version != profile.version {
            return Err(RepoError::VersionConflict {
                entity: "profile",
                id: profile.id.to_string(),
            });
        }
        let mut next = profile.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete_by_user(&self, user: UserId) -> Result<bool, RepoError> {
        Ok(self.profiles.remove(&user).is_some())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPostRepository {
    posts: Arc<DashMap<PostId, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), RepoError> {
        match self.posts.entry(post.id) {
            Entry::Occupied(_) => Err(RepoError::Duplicate {
                entity: "post",
                key: post.id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(post.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.get(&id).map(|p| p.value().clone()))
    }

    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let mut all: Vec<Post> = self.posts.iter().map(|p| p.value().clone()).collect();
        all.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(all)
    }

    async fn update(&self, post: &Post) -> Result<Post, RepoError> {
        let mut stored = self.posts.get_mut(&post.id).ok_or_else(|| RepoError::NotFound {
            entity: "post",
            id: post.id.to_string(),
        })?;
        if stored.version != post.version {
            return Err(RepoError::VersionConflict {
                entity: "post",
                id: post.id.to_string(),
            });
        }
        let mut next = post.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete(&self, id: PostId) -> Result<bool, RepoError> {
        Ok(self.posts.remove(&id).is_some())
    }
}
