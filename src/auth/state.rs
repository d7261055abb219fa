//! Auth configuration and the shared state handed to every handler.

use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;

use super::{
    password::{PasswordConfig, PasswordHasher},
    token::TokenIssuer,
};
use crate::store::CredentialStore;

const DEFAULT_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    token_ttl_seconds: u64,
    cookie_secure: bool,
    password: PasswordConfig,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            cookie_secure: true,
            password: PasswordConfig::default(),
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_password_config(mut self, password: PasswordConfig) -> Self {
        self.password = password;
        self
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

/// Everything the account endpoints need, built once at startup.
pub struct AuthState {
    config: AuthConfig,
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    // Verified against on unknown-email logins so both failure paths cost the same.
    dummy_hash: String,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the signing secret or hashing parameters are invalid.
    pub fn new(config: AuthConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let issuer = TokenIssuer::new(&config.jwt_secret, config.token_ttl_seconds)
            .context("invalid token configuration")?;
        let hasher = PasswordHasher::new(config.password);
        let dummy_hash = hasher
            .hash("ryde-unknown-user")
            .context("invalid password hashing configuration")?;

        Ok(Self {
            config,
            store,
            hasher,
            issuer,
            dummy_hash,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub(crate) fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }
}
