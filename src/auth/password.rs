//! Argon2id password hashing.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

/// Argon2 cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Iterations.
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        // OWASP minimum for Argon2id
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl PasswordConfig {
    /// Cheap parameters for tests. Never use in production.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PasswordHasher {
    config: PasswordConfig,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(PasswordConfig::default())
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.config.memory_cost,
            self.config.time_cost,
            self.config.parallelism,
            None,
        )
        .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash `password` with a fresh random salt, returning a PHC string.
    ///
    /// # Errors
    /// Returns an error if the parameters are invalid or hashing fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("password hashing failed: {e}"))
    }

    /// Check `password` against a stored PHC string.
    ///
    /// Parameters are read from the hash itself, so hashes created with older
    /// settings keep verifying.
    ///
    /// # Errors
    /// Returns an error only if `hash` is not a valid PHC string.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("invalid password hash: {e}"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// [`hash`](Self::hash) on the blocking pool.
    ///
    /// # Errors
    /// Returns an error if hashing fails or the blocking task panics.
    pub async fn hash_blocking(&self, password: String) -> Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hashing task failed")?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    ///
    /// # Errors
    /// Returns an error if `hash` is malformed or the blocking task panics.
    pub async fn verify_blocking(&self, password: String, hash: String) -> Result<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .context("password verification task failed")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(PasswordConfig::fast())
    }

    #[test]
    fn hash_then_verify() -> Result<()> {
        let hasher = hasher();
        let hash = hasher.hash("secret1")?;
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("secret1", &hash)?);
        assert!(!hasher.verify("secret2", &hash)?);
        Ok(())
    }

    #[test]
    fn hashes_are_salted() -> Result<()> {
        let hasher = hasher();
        assert_ne!(hasher.hash("secret1")?, hasher.hash("secret1")?);
        Ok(())
    }

    #[test]
    fn hash_never_contains_plaintext() -> Result<()> {
        let hash = hasher().hash("plain-text-password")?;
        assert!(!hash.contains("plain-text-password"));
        Ok(())
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(hasher().verify("secret1", "not-a-phc-string").is_err());
    }

    #[test]
    fn verify_uses_params_from_hash() -> Result<()> {
        let hash = hasher().hash("secret1")?;
        let production = PasswordHasher::default();
        assert!(production.verify("secret1", &hash)?);
        Ok(())
    }

    #[test]
    fn invalid_params_are_rejected() {
        let hasher = PasswordHasher::new(PasswordConfig {
            memory_cost: 1,
            time_cost: 0,
            parallelism: 0,
        });
        assert!(hasher.hash("secret1").is_err());
    }

    #[tokio::test]
    async fn blocking_variants_agree() -> Result<()> {
        let hasher = hasher();
        let hash = hasher.hash_blocking("secret1".to_string()).await?;
        assert!(hasher.verify_blocking("secret1".to_string(), hash.clone()).await?);
        assert!(!hasher.verify_blocking("nope".to_string(), hash).await?);
        Ok(())
    }
}
