use crate::{api::GIT_COMMIT_HASH, auth::AuthState};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Credential store is reachable", body = Health),
        (status = 503, description = "Credential store is unreachable", body = Health)
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(method: Method, auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let database = match auth_state.store().ping().await {
        Ok(()) => "ok",
        Err(err) => {
            error!("Failed to ping credential store: {err:#}");
            "error"
        }
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    };

    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let short_hash = GIT_COMMIT_HASH.get(0..7).unwrap_or(GIT_COMMIT_HASH);

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )) {
        headers.insert("X-App", value);
    }

    // OPTIONS gets the headers only.
    if method == Method::OPTIONS {
        return (status, headers, Body::empty()).into_response();
    }

    (status, headers, Json(health)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthConfig, PasswordConfig};
    use crate::store::{CredentialStore, MemoryCredentialStore};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use secrecy::SecretString;
    use uuid::Uuid;

    struct DownStore;

    #[async_trait]
    impl CredentialStore for DownStore {
        async fn find_user_by_email(&self, _: &str) -> Result<Option<crate::store::UserRecord>> {
            Err(anyhow!("down"))
        }
        async fn find_user_by_id(&self, _: Uuid) -> Result<Option<crate::store::UserRecord>> {
            Err(anyhow!("down"))
        }
        async fn insert_user(&self, _: crate::store::NewUser) -> Result<crate::store::InsertOutcome> {
            Err(anyhow!("down"))
        }
        async fn blacklist_token(&self, _: &str, _: i64) -> Result<()> {
            Err(anyhow!("down"))
        }
        async fn is_token_blacklisted(&self, _: &str) -> Result<bool> {
            Err(anyhow!("down"))
        }
        async fn purge_expired_tokens(&self, _: i64) -> Result<u64> {
            Err(anyhow!("down"))
        }
        async fn ping(&self) -> Result<()> {
            Err(anyhow!("connection refused"))
        }
    }

    fn state(store: Arc<dyn CredentialStore>) -> Result<Extension<Arc<AuthState>>> {
        let config = AuthConfig::new(SecretString::from("h".repeat(32)))
            .with_password_config(PasswordConfig::fast());
        Ok(Extension(Arc::new(AuthState::new(config, store)?)))
    }

    #[tokio::test]
    async fn healthy_store_reports_ok() -> Result<()> {
        let response = health(Method::GET, state(Arc::new(MemoryCredentialStore::new()))?)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-app"));

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(json["database"], "ok");
        assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_store_is_unavailable() -> Result<()> {
        let response = health(Method::GET, state(Arc::new(DownStore))?)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        Ok(())
    }

    #[tokio::test]
    async fn options_has_no_body() -> Result<()> {
        let response = health(Method::OPTIONS, state(Arc::new(MemoryCredentialStore::new()))?)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert!(body.is_empty());
        Ok(())
    }
}
