//! HS256 JWT implementation of the `TokenService` port. The subject claim
//! carries the user id.

use chrono::{Duration, Utc};
use domains::{AppError, AuthToken, TokenService, UserId};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AuthError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }
        let ttl_secs = i64::try_from(ttl_secs).map_err(|_| AuthError::InvalidTtl(ttl_secs))?;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_secs),
        })
    }

    fn sign(&self, claims: &Claims) -> Result<AuthToken, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map(|token| AuthToken { token })
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: UserId) -> Result<AuthToken, AppError> {
        let now = Utc::now();
        self.sign(&Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        })
    }

    fn verify(&self, token: &str) -> Result<UserId, AppError> {
        let invalid = || AppError::Unauthorized("token is not valid".into());
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                invalid()
            })?;
        UserId::parse(&data.claims.sub).ok_or_else(invalid)
    }
}
