//! Access tokens and the opaque tokens used for refresh and password reset.
//!
//! Access tokens are HS256 JWTs issued by `catalist`. Refresh and reset
//! tokens are random strings handed to the client once; the database keeps
//! only their SHA-256 digest.

use catalist_core::hashing::sha256_hex;
use catalist_core::roles::ROLE_ADMIN;
use catalist_core::types::DbId;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::env_or;

/// `iss` claim of every token this server signs.
pub const TOKEN_ISSUER: &str = "catalist";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// `"admin"` or `"user"` at the time of sign-in.
    pub role: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    fn new(user_id: DbId, role: &str, lifetime_mins: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            role: role.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            exp: now + lifetime_mins * 60,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `60`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or blank, or a lifetime is not a
    /// positive integer.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .expect("JWT_SECRET must be set to a non-empty value");

        let config = Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 60),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 7),
        };
        assert!(
            config.access_token_expiry_mins > 0 && config.refresh_token_expiry_days > 0,
            "JWT token lifetimes must be positive"
        );
        config
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation
    }
}

pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::new(user_id, role, config.access_token_expiry_mins);
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, expiry and issuer, returning the embedded [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )
    .map(|data| data.claims)
}

/// `(plaintext, digest)` for a fresh opaque token. Only the digest is stored.
pub fn generate_opaque_token() -> (String, String) {
    let plaintext = Uuid::new_v4().simple().to_string();
    let hash = hash_token(&plaintext);
    (plaintext, hash)
}

/// Digest used to look up an opaque token presented by a client.
pub fn hash_token(token: &str) -> String {
    sha256_hex(token.trim().as_bytes())
}
