//! Registration, login and current-user lookup.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    AppError, AuthToken, PasswordHasher, Result, TokenService, User, UserId, UserRepository,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::validation::Validator;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Gravatar URL for an address: 200px, PG rating, mystery-person fallback.
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm",
        hex::encode(digest)
    )
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self { users, hasher, tokens }
    }

    #[instrument(skip_all)]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthToken> {
        let mut v = Validator::new();
        let name = v.required("name", input.name.as_deref(), "Name is required");
        let email = v.email("email", input.email.as_deref(), "Please include a valid email");
        let password = v.min_len(
            "password",
            input.password.as_deref(),
            6,
            "Please enter a password with 6 or more characters",
        );
        v.finish()?;
        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(AppError::Internal("registration validation passed with missing fields".into()));
        };

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("registration rejected, email already in use");
            return Err(AppError::Conflict("user already exists".into()));
        }

        let user = User {
            id: UserId::new(),
            avatar: gravatar_url(&email),
            name,
            email,
            password_hash: self.hasher.hash(&password)?,
            created_at: Utc::now(),
        };
        self.users.insert(&user).await?;
        info!(user_id = %user.id, "user registered");
        self.tokens.issue(user.id)
    }

    #[instrument(skip_all)]
    pub async fn login(&self, input: LoginInput) -> Result<AuthToken> {
        let mut v = Validator::new();
        let email = v.email("email", input.email.as_deref(), "Please include a valid email");
        let password = v.required("password", input.password.as_deref(), "Password is required");
        v.finish()?;
        let (Some(email), Some(password)) = (email, password) else {
            return Err(AppError::Internal("login validation passed with missing fields".into()));
        };

        let invalid = || AppError::Unauthorized("invalid credentials".into());
        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !self.hasher.verify(&password, &user.password_hash) {
            warn!(user_id = %user.id, "login rejected, wrong password");
            return Err(invalid());
        }
        info!(user_id = %user.id, "user logged in");
        self.tokens.issue(user.id)
    }

    pub async fn current_user(&self, caller: UserId) -> Result<User> {
        self.users
            .find_by_id(caller)
            .await?
            .ok_or_else(|| AppError::not_found("user", caller))
    }
}
