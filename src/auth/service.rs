//! Registration, login, authentication and logout over [`AuthState`].
//!
//! Flow Overview:
//! 1) `register` validates input, rejects known emails, hashes the password,
//!    stores the user, and issues a token.
//! 2) `login` looks the user up and verifies the password; unknown email and
//!    wrong password are the same error.
//! 3) `authenticate` gates every protected request: blacklist absence, then
//!    signature/expiry, then the user must still exist.
//! 4) `logout` blacklists whatever token was presented.

use tracing::{debug, info, instrument, warn};

use super::{
    error::{AuthError, FieldError, MSG_USER_EXISTS},
    state::AuthState,
    types::{AuthResponse, LoginRequest, RegisterRequest, User},
    utils::{normalize_email, valid_email, valid_password, MIN_PASSWORD_LEN},
};
use crate::store::{now_unix, InsertOutcome, NewUser};

/// Validated registration input.
#[derive(Debug)]
struct Registration {
    firstname: String,
    lastname: String,
    email: String,
    password: String,
}

fn validate_registration(request: RegisterRequest) -> Result<Registration, AuthError> {
    let mut errors = Vec::new();

    let fullname = request.fullname.unwrap_or_default();
    let firstname = fullname.firstname.unwrap_or_default().trim().to_string();
    if firstname.is_empty() {
        errors.push(FieldError::new("fullname.firstname", "First name is required"));
    }
    let lastname = fullname.lastname.unwrap_or_default().trim().to_string();

    let email = normalize_email(request.email.as_deref().unwrap_or_default());
    if !valid_email(&email) {
        errors.push(FieldError::new("email", "Invalid email"));
    }

    let password = request.password.unwrap_or_default();
    if !valid_password(&password) {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        ));
    }

    if errors.is_empty() {
        Ok(Registration {
            firstname,
            lastname,
            email,
            password,
        })
    } else {
        Err(AuthError::Validation(errors))
    }
}

fn validate_login(request: LoginRequest) -> Result<(String, String), AuthError> {
    let mut errors = Vec::new();

    let email = normalize_email(request.email.as_deref().unwrap_or_default());
    if !valid_email(&email) {
        errors.push(FieldError::new("email", "Invalid email"));
    }

    let password = request.password.unwrap_or_default();
    if !valid_password(&password) {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        ));
    }

    if errors.is_empty() {
        Ok((email, password))
    } else {
        Err(AuthError::Validation(errors))
    }
}

/// Create an account and return a token for it.
///
/// # Errors
/// `Validation` for bad input, `Conflict` when the email is taken, `Internal`
/// for store or hashing failures.
#[instrument(skip_all)]
pub async fn register(state: &AuthState, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
    let registration = validate_registration(request)?;

    if state
        .store()
        .find_user_by_email(&registration.email)
        .await?
        .is_some()
    {
        debug!("registration rejected: email already registered");
        return Err(AuthError::Conflict(MSG_USER_EXISTS.to_string()));
    }

    let password_hash = state.hasher().hash_blocking(registration.password).await?;

    let record = match state
        .store()
        .insert_user(NewUser {
            firstname: registration.firstname,
            lastname: registration.lastname,
            email: registration.email,
            password_hash,
        })
        .await?
    {
        InsertOutcome::Created(record) => record,
        // Lost a race with a concurrent registration for the same email.
        InsertOutcome::Conflict => return Err(AuthError::Conflict(MSG_USER_EXISTS.to_string())),
    };

    let token = state.issuer().issue(record.id)?;
    info!(user_id = %record.id, "user registered");

    Ok(AuthResponse {
        token,
        user: User::from(record),
    })
}

/// Check credentials and issue a token.
///
/// # Errors
/// `Validation` for malformed input, `InvalidCredentials` for an unknown email
/// or wrong password, `Internal` for store failures.
#[instrument(skip_all)]
pub async fn login(state: &AuthState, request: LoginRequest) -> Result<AuthResponse, AuthError> {
    let (email, password) = validate_login(request)?;

    let Some(record) = state.store().find_user_by_email(&email).await? else {
        // Burn the same hashing time as a real check.
        let _ = state
            .hasher()
            .verify_blocking(password, state.dummy_hash().to_string())
            .await;
        debug!("login rejected: unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    let matches = state
        .hasher()
        .verify_blocking(password, record.password_hash.clone())
        .await?;
    if !matches {
        debug!(user_id = %record.id, "login rejected: wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let token = state.issuer().issue(record.id)?;
    info!(user_id = %record.id, "user logged in");

    Ok(AuthResponse {
        token,
        user: User::from(record),
    })
}

/// Resolve a presented token to its user.
///
/// # Errors
/// `Blacklisted` for logged-out tokens, `InvalidToken` for bad signatures,
/// expiry, or unknown users, `Internal` for store failures.
#[instrument(skip_all)]
pub async fn authenticate(state: &AuthState, token: &str) -> Result<User, AuthError> {
    if state.store().is_token_blacklisted(token).await? {
        return Err(AuthError::Blacklisted);
    }

    let claims = state
        .issuer()
        .verify(token)
        .map_err(|err| AuthError::InvalidToken(err.to_string()))?;
    let user_id = claims
        .user_id()
        .map_err(|err| AuthError::InvalidToken(err.to_string()))?;

    match state.store().find_user_by_id(user_id).await? {
        Some(record) => Ok(User::from(record)),
        None => {
            warn!(%user_id, "valid token for unknown user");
            Err(AuthError::InvalidToken("user not found".to_string()))
        }
    }
}

/// Blacklist `token` until its own expiry.
///
/// Tokens we can't decode are kept for one full token lifetime.
///
/// # Errors
/// `Internal` if the store write fails.
#[instrument(skip_all)]
pub async fn logout(state: &AuthState, token: &str) -> Result<(), AuthError> {
    let ttl = i64::try_from(state.issuer().ttl_seconds()).unwrap_or(i64::MAX);
    let fallback = now_unix().saturating_add(ttl);
    let expires_at = state
        .issuer()
        .expiry_hint(token)
        .and_then(|exp| i64::try_from(exp).ok())
        .unwrap_or(fallback);

    state.store().blacklist_token(token, expires_at).await?;
    info!("token blacklisted");

    Ok(())
}
