#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use ryde::{
    auth::{AuthConfig, AuthState, PasswordConfig},
    store::MemoryCredentialStore,
};
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret-integration-secret";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AuthState>,
    pub store: Arc<MemoryCredentialStore>,
}

pub fn app() -> Result<TestApp> {
    let store = Arc::new(MemoryCredentialStore::new());
    let config = AuthConfig::new(SecretString::from(SECRET))
        .with_cookie_secure(false)
        .with_password_config(PasswordConfig::fast());
    let state = Arc::new(AuthState::new(config, store.clone())?);
    Ok(TestApp {
        router: ryde::api::router(state.clone()),
        state,
        store,
    })
}

pub async fn send(router: &Router, request: Request<Body>) -> Result<Response<Body>> {
    Ok(router.clone().oneshot(request).await?)
}

pub fn post_json(uri: &str, body: &Value) -> Result<Request<Body>> {
    Ok(Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

pub fn with_bearer(method: &str, uri: &str, token: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?)
}

pub async fn json_body(response: Response<Body>) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn registration(email: &str) -> Value {
    serde_json::json!({
        "fullname": { "firstname": "Ada", "lastname": "Lovelace" },
        "email": email,
        "password": "secret1"
    })
}

/// Register `email` and return the issued token.
pub async fn register(router: &Router, email: &str) -> Result<String> {
    let response = send(router, post_json("/users/register", &registration(email))?).await?;
    let body = json_body(response).await?;
    Ok(body["token"].as_str().unwrap_or_default().to_string())
}
