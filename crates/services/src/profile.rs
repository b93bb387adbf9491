//! Profile aggregate manager: upsert, experience/education entries, reads
//! joined with owner display fields, and self-service account deletion.

use std::sync::Arc;

use domains::{
    AppError, EducationEntry, EntryId, ExperienceEntry, Profile, ProfileFields, ProfileRepository,
    ProfileView, Result, Social, UserId, UserRepository,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::validation::{optional, Validator};

/// Body of the create-or-update call. Every field is optional on the wire so
/// that missing values surface as field violations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    pub company: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    /// Comma-separated list, e.g. `"go, rust, ts"`.
    pub skills: Option<String>,
    #[serde(alias = "githubusername")]
    pub github_username: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
}

impl ProfileInput {
    fn into_fields(self) -> Result<ProfileFields> {
        let mut v = Validator::new();
        let status = v.required("status", self.status.as_deref(), "Status is required");
        let skills = v
            .required("skills", self.skills.as_deref(), "Skills are required")
            .map(|raw| parse_skills(&raw));
        let skills = v.non_empty("skills", skills, "Skills are required");
        v.finish()?;

        Ok(ProfileFields {
            company: optional(self.company),
            location: optional(self.location),
            website: optional(self.website),
            bio: optional(self.bio),
            status,
            skills,
            github_username: optional(self.github_username),
            social: Social {
                youtube: optional(self.youtube),
                twitter: optional(self.twitter),
                instagram: optional(self.instagram),
                linkedin: optional(self.linkedin),
                facebook: optional(self.facebook),
            },
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExperienceInput {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

impl ExperienceInput {
    fn into_entry(self) -> Result<ExperienceEntry> {
        let mut v = Validator::new();
        let title = v.required("title", self.title.as_deref(), "Title is required");
        let company = v.required("company", self.company.as_deref(), "Company is required");
        let from = v.date("from", self.from.as_deref(), true, "From date is required");
        let to = v.date("to", self.to.as_deref(), false, "To date is not a valid date");
        v.date_order(from, to, "to", "To date must not precede from date");
        v.finish()?;

        match (title, company, from) {
            (Some(title), Some(company), Some(from)) => Ok(ExperienceEntry {
                id: EntryId::new(),
                title,
                company,
                location: optional(self.location),
                from,
                to,
                current: self.current,
                description: optional(self.description),
            }),
            _ => Err(AppError::Internal("experience validation passed with missing fields".into())),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EducationInput {
    pub school: Option<String>,
    pub degree: Option<String>,
    #[serde(alias = "fieldofstudy")]
    pub field_of_study: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

impl EducationInput {
    fn into_entry(self) -> Result<EducationEntry> {
        let mut v = Validator::new();
        let school = v.required("school", self.school.as_deref(), "School is required");
        let degree = v.required("degree", self.degree.as_deref(), "Degree is required");
        let field_of_study = v.required(
            "field_of_study",
            self.field_of_study.as_deref(),
            "Field of study is required",
        );
        let from = v.date("from", self.from.as_deref(), true, "From date of study is required");
        let to = v.date("to", self.to.as_deref(), false, "To date is not a valid date");
        v.date_order(from, to, "to", "To date must not precede from date");
        v.finish()?;

        match (school, degree, field_of_study, from) {
            (Some(school), Some(degree), Some(field_of_study), Some(from)) => Ok(EducationEntry {
                id: EntryId::new(),
                school,
                degree,
                field_of_study,
                from,
                to,
                current: self.current,
                description: optional(self.description),
            }),
            _ => Err(AppError::Internal("education validation passed with missing fields".into())),
        }
    }
}

/// Splits on commas, trims each item and drops blanks. Order is kept.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { users, profiles }
    }

    /// Creates the caller's profile or merges the supplied fields into the
    /// existing one. Returns the document as stored after the write.
    #[instrument(skip(self, input), fields(user_id = %caller))]
    pub async fn upsert_profile(&self, caller: UserId, input: ProfileInput) -> Result<Profile> {
        let fields = input.into_fields()?;

        if let Some(mut profile) = self.profiles.find_by_user(caller).await? {
            fields.apply_to(&mut profile);
            let stored = self.profiles.update(&profile).await?;
            info!(profile_id = %stored.id, version = stored.version, "profile updated");
            return Ok(stored);
        }

        let profile = fields
            .into_profile(caller)
            .ok_or_else(|| AppError::Internal("profile fields lost status or skills".into()))?;
        self.profiles.insert(&profile).await?;
        info!(profile_id = %profile.id, "profile created");
        Ok(profile)
    }

    pub async fn current_profile(&self, caller: UserId) -> Result<ProfileView> {
        let profile = self.load(caller).await?;
        self.view(profile).await
    }

    pub async fn list_profiles(&self) -> Result<Vec<ProfileView>> {
        let profiles = self.profiles.list().await?;
        let mut views = Vec::with_capacity(profiles.len());
        for profile in profiles {
            views.push(self.view(profile).await?);
        }
        Ok(views)
    }

    pub async fn profile_by_user(&self, user: UserId) -> Result<ProfileView> {
        let profile = self.load(user).await?;
        self.view(profile).await
    }

    /// Removes the caller's profile, then the identity record. The two writes
    /// are independent; authored posts stay in place.
    #[instrument(skip(self), fields(user_id = %caller))]
    pub async fn delete_account(&self, caller: UserId) -> Result<()> {
        let removed_profile = self.profiles.delete_by_user(caller).await?;
        let removed_user = self.users.delete(caller).await?;
        info!(removed_profile, removed_user, "account deleted");
        Ok(())
    }

    #[instrument(skip(self, input), fields(user_id = %caller))]
    pub async fn add_experience(&self, caller: UserId, input: ExperienceInput) -> Result<Profile> {
        let entry = input.into_entry()?;
        let mut profile = self.load(caller).await?;
        let entry_id = entry.id;
        profile.add_experience(entry);
        let stored = self.profiles.update(&profile).await?;
        info!(%entry_id, "experience added");
        Ok(stored)
    }

    #[instrument(skip(self), fields(user_id = %caller))]
    pub async fn remove_experience(&self, caller: UserId, entry_id: EntryId) -> Result<Profile> {
        let mut profile = self.load(caller).await?;
        if profile.remove_experience(entry_id).is_none() {
            warn!(%entry_id, "experience entry not present, nothing removed");
        }
        Ok(self.profiles.update(&profile).await?)
    }

    #[instrument(skip(self, input), fields(user_id = %caller))]
    pub async fn add_education(&self, caller: UserId, input: EducationInput) -> Result<Profile> {
        let entry = input.into_entry()?;
        let mut profile = self.load(caller).await?;
        let entry_id = entry.id;
        profile.add_education(entry);
        let stored = self.profiles.update(&profile).await?;
        info!(%entry_id, "education added");
        Ok(stored)
    }

    #[instrument(skip(self), fields(user_id = %caller))]
    pub async fn remove_education(&self, caller: UserId, entry_id: EntryId) -> Result<Profile> {
        let mut profile = self.load(caller).await?;
        if profile.remove_education(entry_id).is_none() {
            warn!(%entry_id, "education entry not present, nothing removed");
        }
        Ok(self.profiles.update(&profile).await?)
    }

    async fn load(&self, user: UserId) -> Result<Profile> {
        self.profiles
            .find_by_user(user)
            .await?
            .ok_or_else(|| AppError::not_found("profile for user", user))
    }

    async fn view(&self, profile: Profile) -> Result<ProfileView> {
        let owner = self.users.find_by_id(profile.user).await?.map(|u| u.summary());
        Ok(ProfileView { profile, owner })
    }
}
