//! Sealed cookies for refresh-token transport.
//!
//! The cookie value is `base64url(nonce || AES-256-GCM(name ":" value))`. Binding
//! the cookie name into the sealed payload stops a value from being replayed
//! under a different cookie.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use anyhow::anyhow;
use axum::http::{header::COOKIE, HeaderMap};
use base64ct::{Base64, Base64Url, Encoding};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretBox};

use super::error::AuthError;

pub const REFRESH_COOKIE_NAME: &str = "tessera_refresh_token";
/// Browsers drop cookies longer than this.
pub const MAX_COOKIE_LEN: usize = 4096;
/// Default `Max-Age`, one week, matching the default refresh token lifetime.
pub const COOKIE_MAX_AGE_SECONDS: i64 = 604_800;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Server-held AES-256 key.
pub struct CookieKey(SecretBox<[u8; KEY_LEN]>);

impl CookieKey {
    #[must_use]
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(SecretBox::new(Box::new(bytes)))
    }

    /// Decode a standard base64 string holding exactly 32 bytes.
    ///
    /// # Errors
    /// Returns an error for invalid base64 or a wrong key length.
    pub fn from_base64(encoded: &str) -> anyhow::Result<Self> {
        let decoded = Base64::decode_vec(encoded.trim())
            .map_err(|_| anyhow!("cookie key is not valid base64"))?;
        let bytes: [u8; KEY_LEN] = decoded
            .try_into()
            .map_err(|_| anyhow!("cookie key must decode to exactly {KEY_LEN} bytes"))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Fresh random key, for tests and throwaway local runs.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }
}

#[derive(Clone)]
pub struct CookieCodec {
    cipher: Aes256Gcm,
    max_age_seconds: i64,
}

impl CookieCodec {
    #[must_use]
    pub fn new(key: &CookieKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.0.expose_secret());
        Self {
            cipher: Aes256Gcm::new(key),
            max_age_seconds: COOKIE_MAX_AGE_SECONDS,
        }
    }

    /// Set the `Max-Age` of issued cookies, normally the refresh token TTL.
    #[must_use]
    pub fn with_max_age_seconds(mut self, seconds: i64) -> Self {
        self.max_age_seconds = seconds;
        self
    }

    #[must_use]
    pub fn max_age_seconds(&self) -> i64 {
        self.max_age_seconds
    }

    /// Seal `value` and return the complete `Set-Cookie` header value.
    ///
    /// # Errors
    /// `ValueTooLong` if the serialized cookie exceeds 4096 bytes, internal on
    /// encryption failure.
    pub fn encrypt(&self, name: &str, value: &str) -> Result<String, AuthError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|err| anyhow!("failed to generate cookie nonce: {err}"))?;

        let plaintext = format!("{name}:{value}");
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| anyhow!("cookie encryption failed"))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        let cookie = format!(
            "{name}={}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Lax",
            Base64Url::encode_string(&sealed),
            self.max_age_seconds
        );
        if cookie.len() > MAX_COOKIE_LEN {
            return Err(AuthError::ValueTooLong);
        }
        Ok(cookie)
    }

    /// Open a sealed cookie value and check it was issued under `name`.
    ///
    /// # Errors
    /// `InvalidValue` for anything that does not open cleanly.
    pub fn decrypt(&self, name: &str, cookie_value: &str) -> Result<String, AuthError> {
        let sealed = Base64Url::decode_vec(cookie_value).map_err(|_| AuthError::InvalidValue)?;
        if sealed.len() < NONCE_LEN {
            return Err(AuthError::InvalidValue);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AuthError::InvalidValue)?;
        let plaintext = String::from_utf8(plaintext).map_err(|_| AuthError::InvalidValue)?;

        match plaintext.split_once(':') {
            Some((sealed_name, value)) if sealed_name == name => Ok(value.to_string()),
            _ => Err(AuthError::InvalidValue),
        }
    }

    /// `Set-Cookie` value that makes the browser drop `name`.
    #[must_use]
    pub fn clear(name: &str) -> String {
        format!("{name}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=Lax")
    }
}

/// Raw value of cookie `name` from the request's `Cookie` headers.
#[must_use]
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
