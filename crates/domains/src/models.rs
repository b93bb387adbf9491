//! # Domain Models
//!
//! Users, profiles and posts. Profiles and posts are aggregates: they are
//! loaded and persisted as a whole, embedded lists included, and carry a
//! `version` that the repositories use for optimistic concurrency.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::policy::{self, Keyed, Owned};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parses a path or token value. Malformed input yields `None`.
            pub fn parse(s: &str) -> Option<Self> {
                Uuid::parse_str(s.trim()).ok().map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identity of a registered user.
    UserId
);
id_type!(ProfileId);
id_type!(PostId);
id_type!(CommentId);
id_type!(
    /// Identity of an experience or education entry inside a profile.
    EntryId
);

// ============================================================================
// Identity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Stored trimmed and lower-cased; unique across users.
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Display fields of a user, attached to profiles when they are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub avatar: String,
}

/// Signed bearer token handed out on registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

// ============================================================================
// Profile aggregate
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Social {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
}

impl Social {
    /// Overwrites only the links present in `other`.
    pub fn merge(&mut self, other: Social) {
        if other.youtube.is_some() {
            self.youtube = other.youtube;
        }
        if other.twitter.is_some() {
            self.twitter = other.twitter;
        }
        if other.instagram.is_some() {
            self.instagram = other.instagram;
        }
        if other.linkedin.is_some() {
            self.linkedin = other.linkedin;
        }
        if other.facebook.is_some() {
            self.facebook = other.facebook;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: EntryId,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub id: EntryId,
    pub school: String,
    pub degree: String,
    #[serde(alias = "fieldofstudy")]
    pub field_of_study: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    /// Owner. At most one profile exists per user.
    pub user: UserId,
    pub company: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub github_username: Option<String>,
    #[serde(default)]
    pub social: Social,
    /// Most recent first.
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    /// Most recent first.
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Profile {
    pub fn add_experience(&mut self, entry: ExperienceEntry) {
        policy::push_front(&mut self.experience, entry);
    }

    /// Unknown ids leave the list untouched.
    pub fn remove_experience(&mut self, id: EntryId) -> Option<ExperienceEntry> {
        policy::remove_by_key(&mut self.experience, &id)
    }

    pub fn add_education(&mut self, entry: EducationEntry) {
        policy::push_front(&mut self.education, entry);
    }

    /// Unknown ids leave the list untouched.
    pub fn remove_education(&mut self, id: EntryId) -> Option<EducationEntry> {
        policy::remove_by_key(&mut self.education, &id)
    }
}

/// Sparse set of profile fields. `None` means "not supplied": merging never
/// clears a stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub skills: Option<Vec<String>>,
    pub github_username: Option<String>,
    pub social: Social,
}

impl ProfileFields {
    pub fn apply_to(self, profile: &mut Profile) {
        fn set(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut profile.company, self.company);
        set(&mut profile.location, self.location);
        set(&mut profile.website, self.website);
        set(&mut profile.bio, self.bio);
        set(&mut profile.github_username, self.github_username);
        if let Some(status) = self.status {
            profile.status = status;
        }
        if let Some(skills) = self.skills {
            profile.skills = skills;
        }
        profile.social.merge(self.social);
    }

    /// Builds a fresh profile for `user`. Returns `None` when the mandatory
    /// status or skills are missing.
    pub fn into_profile(self, user: UserId) -> Option<Profile> {
        let status = self.status.clone()?;
        let skills = self.skills.clone()?;
        let mut profile = Profile {
            id: ProfileId::new(),
            user,
            company: None,
            location: None,
            website: None,
            bio: None,
            status,
            skills,
            github_username: None,
            social: Social::default(),
            experience: Vec::new(),
            education: Vec::new(),
            date: Utc::now(),
            version: 0,
        };
        self.apply_to(&mut profile);
        Some(profile)
    }
}

/// A profile as returned by read endpoints, joined with its owner's
/// display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub owner: Option<UserSummary>,
}

// ============================================================================
// Post aggregate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub user: UserId,
    pub text: String,
    /// Commenter display fields, frozen when the comment was written.
    pub name: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(author: &User, text: String) -> Self {
        Self {
            id: CommentId::new(),
            user: author.id,
            text,
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Author.
    pub user: UserId,
    pub text: String,
    /// Author display fields, frozen when the post was created.
    pub name: String,
    pub avatar: String,
    /// Most recent first; at most one entry per user.
    #[serde(default)]
    pub likes: Vec<Like>,
    /// Most recent first.
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Post {
    pub fn new(author: &User, text: String) -> Self {
        Self {
            id: PostId::new(),
            user: author.id,
            text,
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            likes: Vec::new(),
            comments: Vec::new(),
            date: Utc::now(),
            version: 0,
        }
    }

    pub fn like(&mut self, user: UserId) -> Result<()> {
        policy::insert_unique(&mut self.likes, Like { user }, "post already liked")
    }

    pub fn unlike(&mut self, user: UserId) -> Result<()> {
        policy::remove_by_key(&mut self.likes, &user)
            .map(|_| ())
            .ok_or_else(|| crate::AppError::Conflict("post has not yet been liked".into()))
    }

    pub fn add_comment(&mut self, comment: Comment) {
        policy::push_front(&mut self.comments, comment);
    }

    /// Removes a comment written by `caller`. The post author has no special
    /// right over other people's comments.
    pub fn remove_comment(&mut self, caller: UserId, id: CommentId) -> Result<Comment> {
        let index = policy::position_of(&self.comments, &id)
            .ok_or_else(|| crate::AppError::not_found("comment", id))?;
        policy::ensure_owner(&self.comments[index], caller, "comment")?;
        Ok(self.comments.remove(index))
    }
}

// ============================================================================
// Policy wiring
// ============================================================================

impl Keyed for Like {
    type Key = UserId;
    fn key(&self) -> &UserId {
        &self.user
    }
}

impl Keyed for Comment {
    type Key = CommentId;
    fn key(&self) -> &CommentId {
        &self.id
    }
}

impl Keyed for ExperienceEntry {
    type Key = EntryId;
    fn key(&self) -> &EntryId {
        &self.id
    }
}

impl Keyed for EducationEntry {
    type Key = EntryId;
    fn key(&self) -> &EntryId {
        &self.id
    }
}

impl Owned for Comment {
    fn owner(&self) -> UserId {
        self.user
    }
}

impl Owned for Post {
    fn owner(&self) -> UserId {
        self.user
    }
}

impl Owned for Profile {
    fn owner(&self) -> UserId {
        self.user
    }
}
