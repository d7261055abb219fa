use super::handlers::{health, users};
use crate::auth::{
    error::{ErrorBody, FieldError},
    types::{AuthResponse, FullName, FullNameInput, LoginRequest, MessageResponse, RegisterRequest, User},
    TOKEN_COOKIE_NAME,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::register,
        users::login,
        users::profile,
        users::logout
    ),
    components(schemas(
        health::Health,
        RegisterRequest,
        FullNameInput,
        LoginRequest,
        AuthResponse,
        User,
        FullName,
        MessageResponse,
        ErrorBody,
        FieldError
    )),
    modifiers(&SessionSecurity),
    tags(
        (name = "users", description = "Registration, login, profile and logout"),
        (name = "health", description = "Liveness probe")
    )
)]
struct ApiDoc;

/// Registers the two ways a client can present its token.
struct SessionSecurity;

impl Modify for SessionSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(TOKEN_COOKIE_NAME))),
            );
        }
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn documents_user_routes() {
        let doc = openapi();
        for path in [
            "/health",
            "/users/register",
            "/users/login",
            "/users/profile",
            "/users/logout",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn declares_security_schemes() {
        let doc = openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.security_schemes.contains_key("cookie"));
    }
}
