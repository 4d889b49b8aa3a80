//! API handlers and the authenticated principal extraction they share.

pub mod health;
pub mod tokens;
pub mod users;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use uuid::Uuid;

use crate::auth::{AuthError, AuthService, User};

/// Authenticated user context derived from a bearer access token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub activated: bool,
    pub user: User,
}

/// Resolve the `Authorization: Bearer` access token into a principal.
///
/// # Errors
/// `InvalidToken` when the header is missing or the token does not validate.
pub async fn require_auth(headers: &HeaderMap, auth: &AuthService) -> Result<Principal, AuthError> {
    let token = extract_bearer_token(headers).ok_or(AuthError::InvalidToken)?;
    let user = auth.authenticate(&token).await?;
    Ok(Principal {
        user_id: user.id,
        email: user.email.clone(),
        activated: user.activated,
        user,
    })
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
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::{
        auth::{
            password::test_verifier, AuthConfig, AuthService, CookieCodec, CookieKey, MemoryStore,
        },
        mail::LogEmailSender,
    };

    pub(crate) fn service() -> (Arc<MemoryStore>, Arc<AuthService>) {
        let store = Arc::new(MemoryStore::new());
        let service = AuthService::new(
            store.clone(),
            store.clone(),
            test_verifier(),
            CookieCodec::new(&CookieKey::generate()),
            Arc::new(LogEmailSender),
            AuthConfig::new(),
        );
        (store, Arc::new(service))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extract_bearer_token_accepts_both_cases() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer ABC"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("ABC"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer  XYZ "));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("XYZ"));
    }

    #[test]
    fn extract_bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_none());
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(extract_bearer_token(&headers).is_none());
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_none());
    }

    #[tokio::test]
    async fn require_auth_without_header_is_invalid_token() {
        let (_store, service) = test_support::service();
        let result = require_auth(&HeaderMap::new(), &service).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
