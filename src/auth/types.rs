//! Request/response records for the auth endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{
    error::{AuthError, Validator},
    token::TOKEN_PLAINTEXT_LEN,
    IssuedToken,
};

const PASSWORD_MIN_BYTES: usize = 8;
// Bounded so argon2 input stays small on hostile payloads.
const PASSWORD_MAX_BYTES: usize = 72;
const NAME_MAX_BYTES: usize = 500;

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

fn check_email(v: &mut Validator, email: &str) {
    let email = normalize_email(email);
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(valid_email(&email), "email", "must be a valid email address");
}

fn check_password(v: &mut Validator, field: &'static str, password: &str) {
    v.check(!password.is_empty(), field, "must be provided");
    v.check(
        password.len() >= PASSWORD_MIN_BYTES,
        field,
        "must be at least 8 bytes long",
    );
    v.check(
        password.len() <= PASSWORD_MAX_BYTES,
        field,
        "must not be more than 72 bytes long",
    );
}

fn check_token(v: &mut Validator, token: &str) {
    v.check(!token.is_empty(), "token", "must be provided");
    v.check(
        token.len() == TOKEN_PLAINTEXT_LEN,
        "token",
        "must be 26 bytes long",
    );
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// # Errors
    /// Returns `AuthError::Validation` with one message per failing field.
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut v = Validator::new();
        v.check(!self.name.trim().is_empty(), "name", "must be provided");
        v.check(
            self.name.len() <= NAME_MAX_BYTES,
            "name",
            "must not be more than 500 bytes long",
        );
        check_email(&mut v, &self.email);
        check_password(&mut v, "password", &self.password);
        v.finish()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ActivateRequest {
    pub token: String,
}

impl ActivateRequest {
    /// # Errors
    /// Returns `AuthError::Validation` for a missing or malformed token.
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut v = Validator::new();
        check_token(&mut v, &self.token);
        v.finish()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// # Errors
    /// Returns `AuthError::Validation` with one message per failing field.
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut v = Validator::new();
        check_email(&mut v, &self.email);
        check_password(&mut v, "password", &self.password);
        v.finish()
    }
}

/// Body of the resend-activation and password-reset requests.
#[derive(Serialize, Deserialize, Debug)]
pub struct EmailRequest {
    pub email: String,
}

impl EmailRequest {
    /// # Errors
    /// Returns `AuthError::Validation` for a malformed email.
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut v = Validator::new();
        check_email(&mut v, &self.email);
        v.finish()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

impl ResetPasswordRequest {
    /// # Errors
    /// Returns `AuthError::Validation` with one message per failing field.
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut v = Validator::new();
        check_token(&mut v, &self.token);
        check_password(&mut v, "password", &self.password);
        v.finish()
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

impl From<&IssuedToken> for TokenResponse {
    fn from(token: &IssuedToken) -> Self {
        Self {
            token: token.plaintext.clone(),
            expiry: token.expiry,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AccessTokenResponse {
    pub authentication_token: TokenResponse,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
