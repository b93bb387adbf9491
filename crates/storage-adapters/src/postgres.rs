//! # PostgreSQL document store
//!
//! Users map onto relational columns. Profiles and posts are stored as whole
//! JSONB documents next to a `version` column; rewrites are
//! `UPDATE .. WHERE version = $loaded`, so a stale writer touches zero rows.

use async_trait::async_trait;
use domains::{
    Post, PostId, PostRepository, Profile, ProfileRepository, RepoError, User, UserId,
    UserRepository,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::{error, info};

fn backend(err: sqlx::Error) -> RepoError {
    error!(error = %err, "postgres query failed");
    RepoError::Backend(err.to_string())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// Opens a pool and applies the embedded migrations.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, RepoError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(backend)?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| RepoError::Backend(e.to_string()))?;
    info!(max_connections, "postgres document store ready");
    Ok(pool)
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, RepoError> {
    Ok(User {
        id: UserId(row.try_get("id").map_err(backend)?),
        name: row.try_get("name").map_err(backend)?,
        email: row.try_get("email").map_err(backend)?,
        password_hash: row.try_get("password_hash").map_err(backend)?,
        avatar: row.try_get("avatar").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, avatar, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id.0)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                RepoError::Duplicate {
                    entity: "user",
                    key: user.email.clone(),
                }
            } else {
                backend(err)
            }
        })?;
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}

fn doc_from_row<T: serde::de::DeserializeOwned>(row: &PgRow) -> Result<T, RepoError> {
    let Json(doc) = row.try_get::<Json<T>, _>("doc").map_err(backend)?;
    Ok(doc)
}

#[derive(Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_user(&self, user: UserId) -> Result<Option<Profile>, RepoError> {
        let row = sqlx::query("SELECT doc FROM profiles WHERE user_id = $1")
            .bind(user.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(doc_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Profile>, RepoError> {
        sqlx::query("SELECT doc FROM profiles ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?
            .iter()
            .map(doc_from_row)
            .collect()
    }

    async fn insert(&self, profile: &Profile) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO profiles (id, user_id, version, created_at, doc) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(profile.id.0)
        .bind(profile.user.0)
        .bind(profile.version as i64)
        .bind(profile.date)
        .bind(Json(profile))
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                RepoError::Duplicate {
                    entity: "profile",
                    key: profile.user.to_string(),
                }
            } else {
                backend(err)
            }
        })?;
        Ok(())
    }

    async fn update(&self, profile: &Profile) -> Result<Profile, RepoError> {
        let mut next = profile.clone();
        next.version += 1;
        let result = sqlx::query(
            "UPDATE profiles SET doc = $1, version = $2 WHERE user_id = $3 AND version = $4",
        )
        .bind(Json(&next))
        .bind(next.version as i64)
        .bind(profile.user.0)
        .bind(profile.version as i64)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM profiles WHERE user_id = $1")
                .bind(profile.user.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?
                .is_some();
            let id = profile.id.to_string();
            return Err(if exists {
                RepoError::VersionConflict { entity: "profile", id }
            } else {
                RepoError::NotFound { entity: "profile", id }
            });
        }
        Ok(next)
    }

    async fn delete_by_user(&self, user: UserId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user.0)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO posts (id, user_id, version, created_at, doc) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(post.id.0)
        .bind(post.user.0)
        .bind(post.version as i64)
        .bind(post.date)
        .bind(Json(post))
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let row = sqlx::query("SELECT doc FROM posts WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(doc_from_row).transpose()
    }

    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        sqlx::query("SELECT doc FROM posts ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?
            .iter()
            .map(doc_from_row)
            .collect()
    }

    async fn update(&self, post: &Post) -> Result<Post, RepoError> {
        let mut next = post.clone();
        next.version += 1;
        let result = sqlx::query("UPDATE posts SET doc = $1, version = $2 WHERE id = $3 AND version = $4")
            .bind(Json(&next))
            .bind(next.version as i64)
            .bind(post.id.0)
            .bind(post.version as i64)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            let exists = self.find_by_id(post.id).await?.is_some();
            let id = post.id.to_string();
            return Err(if exists {
                RepoError::VersionConflict { entity: "post", id }
            } else {
                RepoError::NotFound { entity: "post", id }
            });
        }
        Ok(next)
    }

    async fn delete(&self, id: PostId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}
