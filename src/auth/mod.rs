//! Token core: credential hashing, token issuance/validation, refresh rotation and
//! sealed cookies.
//!
//! ## Flow Overview
//!
//! 1. Registration hashes the password (`CredentialVerifier`) and mints an
//!    `activation` token (`TokenIssuer`) that is mailed to the user.
//! 2. Login compares the password and mints an `access` + `refresh` pair. The
//!    refresh plaintext is sealed into a cookie (`CookieCodec`).
//! 3. A refresh request opens the cookie and hands the plaintext to the
//!    `RefreshRotationGuard`, which either rotates the pair or, on replay of a
//!    consumed token, revokes the user's refresh tokens.
//!
//! Only SHA-256 digests of tokens are stored; see [`token::hash_token`].

pub mod cookie;
pub mod error;
pub mod password;
pub mod rotation;
pub mod scope;
pub mod service;
pub mod store;
pub mod token;
pub mod types;
pub mod validator;

pub use cookie::{CookieCodec, CookieKey, REFRESH_COOKIE_NAME};
pub use error::AuthError;
pub use password::{CredentialVerifier, PasswordCost};
pub use rotation::{RefreshRotationGuard, RevocationPolicy, TokenPair};
pub use scope::Scope;
pub use service::{AuthConfig, AuthService};
pub use store::{MemoryStore, PgStore, TokenStore, User, UserStore};
pub use token::{IssuedToken, TokenIssuer};
pub use validator::TokenValidator;
