//! JWT authentication module.
//!
//! Login lives with the identity service; this server only verifies the
//! bearer tokens it signs and turns their claims into an [`Actor`].

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use venue_core::{Actor, Role};

use crate::error::ApiError;
use crate::AppState;

/// Lifetime of tokens minted by [`JwtManager::issue`]: one shift.
pub const TOKEN_LIFETIME_SECS: i64 = 12 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (staff id)
    pub sub: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token for `actor`. Used by tooling and tests.
    pub fn issue(&self, actor: &Actor) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: actor.id.clone(),
            role: actor.role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| ApiError::unauthenticated(format!("Invalid token: {}", e)))
    }

    pub fn actor(&self, token: &str) -> Result<Actor, ApiError> {
        let claims = self.verify(token)?;
        Ok(Actor::new(claims.sub, claims.role))
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The authenticated caller, pulled from `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Actor);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("Missing authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthenticated("Invalid authorization header"))?;

        state.jwt.actor(token).map(Authenticated)
    }
}
