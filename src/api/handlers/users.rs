//! `/users` endpoints: register, login, profile, logout.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, instrument};

use crate::auth::{
    error::{AuthError, ErrorBody},
    principal::require_auth,
    service,
    session::{clear_token_cookie, extract_token, token_cookie},
    types::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, User},
    AuthState,
};

fn missing_payload() -> AuthError {
    AuthError::validation("body", "Missing or malformed JSON payload")
}

#[utoipa::path(
    post,
    path = "/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Invalid input or user already exists", body = ErrorBody),
        (status = 500, description = "Unexpected failure", body = ErrorBody)
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(missing_payload());
    };

    let response = service::register(&auth_state, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; also sets the `token` cookie", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Invalid email or password", body = ErrorBody)
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(missing_payload());
    };

    let response = service::login(&auth_state, request).await?;

    let cookie = token_cookie(auth_state.config(), &response.token)
        .map_err(|err| AuthError::Internal(anyhow::anyhow!("failed to build token cookie: {err}")))?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    Ok((StatusCode::OK, headers, Json(response)))
}

#[utoipa::path(
    get,
    path = "/users/profile",
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 401, description = "Missing, invalid or logged-out token", body = ErrorBody)
    ),
    security(("bearer" = []), ("cookie" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn profile(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Json<User>, AuthError> {
    let principal = require_auth(&headers, &auth_state).await?;
    Ok(Json(principal.user))
}

#[utoipa::path(
    post,
    path = "/users/logout",
    responses(
        (status = 200, description = "Token blacklisted and cookie cleared", body = MessageResponse),
        (status = 400, description = "No token provided", body = ErrorBody)
    ),
    security(("bearer" = []), ("cookie" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn logout(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let result = match extract_token(&headers) {
        Some(token) => service::logout(&auth_state, &token).await,
        None => Err(AuthError::MissingToken),
    };

    let mut response = match result {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Logged out successfully".to_string(),
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    };

    // Clear the cookie whatever the outcome.
    match clear_token_cookie(auth_state.config()) {
        Ok(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("failed to build clearing cookie: {err}"),
    }

    response
}
