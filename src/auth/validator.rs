use std::sync::Arc;

use super::{
    error::AuthError,
    scope::Scope,
    store::{TokenStore, User},
    token::{hash_token, valid_plaintext},
};

/// Resolves a presented plaintext to the user that owns it.
#[derive(Clone)]
pub struct TokenValidator {
    store: Arc<dyn TokenStore>,
}

impl TokenValidator {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Look up the owner of an unexpired `scope` token.
    ///
    /// Malformed, unknown, expired and wrong-scope tokens all yield
    /// `AuthError::InvalidToken`.
    ///
    /// # Errors
    /// Returns `InvalidToken` as above, or an internal error on storage failure.
    pub async fn validate(&self, plaintext: &str, scope: Scope) -> Result<User, AuthError> {
        if !valid_plaintext(plaintext) {
            return Err(AuthError::InvalidToken);
        }
        let hash = hash_token(plaintext);
        self.store
            .user_for_token(&hash, scope)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}
