//! Token transport: the `token` cookie and the bearer header.

use axum::http::{
    header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};

use super::state::AuthConfig;

pub const TOKEN_COOKIE_NAME: &str = "token";

/// `HttpOnly` cookie carrying a freshly issued token.
pub(crate) fn token_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.token_ttl_seconds();
    let mut cookie = format!(
        "{TOKEN_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_token_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{TOKEN_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Token presented with the request: the cookie wins over the bearer header.
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    extract_cookie_token(headers).or_else(|| extract_bearer_token(headers))
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().map(str::trim);
            let val = parts.next().map(str::trim);
            if let (Some(TOKEN_COOKIE_NAME), Some(val)) = (key, val) {
                if !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config(secure: bool) -> AuthConfig {
        AuthConfig::new(SecretString::from("x".repeat(32)))
            .with_token_ttl_seconds(120)
            .with_cookie_secure(secure)
    }

    fn header_map(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn cookie_is_http_only_and_secure() -> Result<(), InvalidHeaderValue> {
        let cookie = token_cookie(&config(true), "abc")?;
        let cookie = cookie.to_str().unwrap_or_default();
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=120"));
        assert!(cookie.ends_with("; Secure"));
        Ok(())
    }

    #[test]
    fn insecure_cookie_omits_secure_flag() -> Result<(), InvalidHeaderValue> {
        let cookie = token_cookie(&config(false), "abc")?;
        assert!(!cookie.to_str().unwrap_or_default().contains("Secure"));
        Ok(())
    }

    #[test]
    fn clear_cookie_expires_immediately() -> Result<(), InvalidHeaderValue> {
        let cookie = clear_token_cookie(&config(true))?;
        let cookie = cookie.to_str().unwrap_or_default();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
        Ok(())
    }

    #[test]
    fn extracts_cookie_among_others() {
        let headers = header_map(&[("cookie", "theme=dark; token=abc.def.ghi; lang=en")]);
        assert_eq!(extract_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let headers = header_map(&[
            ("cookie", "token=from-cookie"),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(extract_token(&headers), Some("from-cookie".to_string()));
    }

    #[test]
    fn falls_back_to_bearer() {
        let headers = header_map(&[("cookie", "theme=dark"), ("authorization", "Bearer xyz")]);
        assert_eq!(extract_token(&headers), Some("xyz".to_string()));

        let headers = header_map(&[("authorization", "bearer lower")]);
        assert_eq!(extract_token(&headers), Some("lower".to_string()));
    }

    #[test]
    fn empty_or_foreign_schemes_yield_none() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
        assert_eq!(extract_token(&header_map(&[("authorization", "Bearer ")])), None);
        assert_eq!(extract_token(&header_map(&[("authorization", "Basic dXNlcg==")])), None);
        assert_eq!(extract_token(&header_map(&[("cookie", "token=")])), None);
    }
}
