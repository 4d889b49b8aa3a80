//! # Tessera (opaque bearer tokens)
//!
//! `tessera` issues, validates and rotates opaque bearer tokens and carries the
//! long-lived refresh token to clients inside an encrypted cookie.
//!
//! ## Tokens
//!
//! A token is 16 random bytes encoded as 26 characters of unpadded base32. Only
//! the SHA-256 digest is stored; the plaintext is handed to the caller once and
//! can never be recovered from the database. Every token carries a scope
//! (`access`, `activation`, `password-reset`, `refresh`) and validation always
//! matches on it.
//!
//! ## Refresh Rotation
//!
//! Refresh tokens are single use. Exchanging one marks it deactivated and mints a
//! new refresh/access pair in the same storage transaction. Presenting a
//! deactivated refresh token again is treated as theft: every refresh token of the
//! owner is deleted and the caller has to log in again.
//!
//! ## Cookies
//!
//! The refresh token travels in `tessera_refresh_token`, sealed with AES-256-GCM
//! under the server key. The cookie name is bound into the ciphertext so a value
//! cannot be replayed under another cookie name.

pub mod api;
pub mod auth;
pub mod cli;
pub mod mail;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
