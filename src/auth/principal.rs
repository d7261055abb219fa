//! Authenticated principal extraction.
//!
//! Read the token from the cookie or bearer header, run it through
//! [`service::authenticate`], and hand the user to the handler.

use axum::http::HeaderMap;

use super::{error::AuthError, service, session::extract_token, state::AuthState, types::User};

/// The user a request's token resolved to.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user: User,
}

/// Resolve the request's token into a principal, or fail with a 401.
///
/// # Errors
/// `Unauthorized` when no token is present, otherwise whatever
/// [`service::authenticate`] rejects with.
pub async fn require_auth(headers: &HeaderMap, state: &AuthState) -> Result<Principal, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::Unauthorized)?;
    let user = service::authenticate(state, &token).await?;
    Ok(Principal { user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        password::PasswordConfig,
        state::AuthConfig,
        types::{FullNameInput, RegisterRequest},
    };
    use crate::store::MemoryCredentialStore;
    use axum::http::{header, HeaderValue};
    use secrecy::SecretString;
    use std::sync::Arc;

    fn state() -> AuthState {
        let config = AuthConfig::new(SecretString::from("p".repeat(32)))
            .with_password_config(PasswordConfig::fast());
        AuthState::new(config, Arc::new(MemoryCredentialStore::new()))
            .unwrap_or_else(|e| panic!("state: {e}"))
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .unwrap_or_else(|e| panic!("header: {e}"));
        headers.insert(header::AUTHORIZATION, value);
        headers
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let result = require_auth(&HeaderMap::new(), &state()).await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn valid_token_resolves_user() -> anyhow::Result<()> {
        let state = state();
        let response = service::register(
            &state,
            RegisterRequest {
                fullname: Some(FullNameInput {
                    firstname: Some("Ada".to_string()),
                    lastname: None,
                }),
                email: Some("ada@example.com".to_string()),
                password: Some("secret1".to_string()),
            },
        )
        .await?;

        let principal = require_auth(&bearer(&response.token), &state).await?;
        assert_eq!(principal.user, response.user);
        Ok(())
    }

    #[tokio::test]
    async fn logged_out_token_is_rejected() -> anyhow::Result<()> {
        let state = state();
        let response = service::register(
            &state,
            RegisterRequest {
                fullname: Some(FullNameInput {
                    firstname: Some("Grace".to_string()),
                    lastname: None,
                }),
                email: Some("grace@example.com".to_string()),
                password: Some("secret1".to_string()),
            },
        )
        .await?;
        service::logout(&state, &response.token).await?;

        let result = require_auth(&bearer(&response.token), &state).await;
        assert!(matches!(result, Err(AuthError::Blacklisted)));
        Ok(())
    }
}
