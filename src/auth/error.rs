use std::collections::BTreeMap;

use thiserror::Error;

/// Failure kinds surfaced by the token core.
///
/// Everything except `Internal` is a business-rule outcome the caller can act on
/// (log in again, fix the input). `Internal` wraps RNG, crypto and storage
/// failures; its detail is logged and never shown to clients.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown, expired or wrong-scope token. The three causes are not told apart.
    #[error("invalid or expired authentication token")]
    InvalidToken,
    /// A consumed refresh token was presented again.
    #[error("refresh token reuse detected")]
    ReusedRefreshToken,
    /// Unknown email or wrong password. Same signal for both.
    #[error("invalid authentication credentials")]
    InvalidCredentials,
    #[error("cookie value too long")]
    ValueTooLong,
    #[error("invalid cookie value")]
    InvalidValue,
    #[error("a user with this email address already exists")]
    DuplicateEmail,
    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,
    #[error("your user account must be activated to access this resource")]
    InactiveAccount,
    #[error("request validation failed")]
    Validation(BTreeMap<&'static str, &'static str>),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Whether the error carries server-side detail that must not reach clients.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Collects field errors for typed request validation.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<&'static str, &'static str>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless `ok` holds. The first message per field wins.
    pub fn check(&mut self, ok: bool, field: &'static str, message: &'static str) {
        if !ok {
            self.errors.entry(field).or_insert(message);
        }
    }

    /// # Errors
    /// Returns `AuthError::Validation` when any check failed.
    pub fn finish(self) -> Result<(), AuthError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn validator_keeps_first_message_per_field() {
        let mut v = Validator::new();
        v.check(false, "email", "must be provided");
        v.check(false, "email", "must be a valid email address");
        v.check(true, "name", "must be provided");
        match v.finish() {
            Err(AuthError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors.get("email"), Some(&"must be provided"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validator_passes_when_clean() {
        let mut v = Validator::new();
        v.check(true, "email", "must be provided");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn internal_errors_are_flagged() {
        assert!(AuthError::from(anyhow!("db down")).is_internal());
        assert!(!AuthError::InvalidToken.is_internal());
    }
}
