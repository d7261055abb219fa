//! Signed, time-bounded identity tokens (HS256 JWT).

use anyhow::{anyhow, Context, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use ulid::Ulid;
use uuid::Uuid;

pub const TOKEN_ISSUER: &str = "ryde";

/// Secrets shorter than this are refused at startup.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime: one year.
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
    /// Unique per token, so every issued token is a distinct string.
    pub jti: String,
}

impl Claims {
    /// Parse `sub` back into a user id.
    ///
    /// # Errors
    /// Returns an error if `sub` is not a UUID.
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).context("token subject is not a user id")
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("keys", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenIssuer {
    /// Build an issuer from the process signing secret.
    ///
    /// # Errors
    /// Returns an error if the secret is shorter than [`MIN_SECRET_LEN`] bytes
    /// or the TTL is zero or above [`MAX_TTL_SECONDS`].
    pub fn new(secret: &SecretString, ttl_seconds: u64) -> Result<Self> {
        let bytes = secret.expose_secret().as_bytes();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(anyhow!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes, got {}",
                bytes.len()
            ));
        }
        if ttl_seconds == 0 || ttl_seconds > MAX_TTL_SECONDS {
            return Err(anyhow!(
                "token TTL must be between 1 and {MAX_TTL_SECONDS} seconds, got {ttl_seconds}"
            ));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_seconds,
        })
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Mint a token for `user_id`.
    ///
    /// # Errors
    /// Returns an error if the system clock is before the unix epoch, the
    /// expiry does not fit in a `u64`, or encoding fails.
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock before unix epoch")?
            .as_secs();
        let claims = Claims {
            sub: user_id.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now,
            exp: now
                .checked_add(self.ttl_seconds)
                .context("token expiry overflows")?,
            jti: Ulid::new().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).context("failed to sign token")
    }

    fn validation(validate_exp: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.leeway = 0;
        validation.validate_exp = validate_exp;
        validation
    }

    /// Check signature, issuer, and expiry.
    ///
    /// # Errors
    /// Returns an error describing why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Self::validation(true)).map(|data| data.claims)
    }

    /// `exp` of a token signed by this issuer, ignoring whether it has passed.
    ///
    /// Returns `None` for tokens that were not signed with our key.
    #[must_use]
    pub fn expiry_hint(&self, token: &str) -> Option<u64> {
        decode::<Claims>(token, &self.decoding, &Self::validation(false))
            .ok()
            .map(|data| data.claims.exp)
    }
}
