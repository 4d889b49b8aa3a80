//! Opaque token generation and issuance.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use super::{error::AuthError, scope::Scope, store::TokenStore};

/// Random bytes behind every token.
pub const TOKEN_ENTROPY_BYTES: usize = 16;
/// Length of the base32 plaintext handed to clients.
pub const TOKEN_PLAINTEXT_LEN: usize = 26;

const INSERT_ATTEMPTS: usize = 3;
const BASE32: base32::Alphabet = base32::Alphabet::Rfc4648 { padding: false };

/// SHA-256 digest of a token plaintext. This is the only form that is persisted.
pub type TokenHash = [u8; 32];

/// A freshly minted token. The plaintext is not recoverable once this is dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedToken {
    pub plaintext: String,
    pub expiry: DateTime<Utc>,
    pub scope: Scope,
}

/// Row shape of the `tokens` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRecord {
    pub hash: TokenHash,
    pub user_id: Uuid,
    pub scope: Scope,
    pub expiry: DateTime<Utc>,
}

/// Draw 16 bytes from the OS RNG and encode them as unpadded base32.
///
/// # Errors
/// Returns an error if the OS RNG fails.
pub fn generate_plaintext() -> anyhow::Result<String> {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate token")?;
    Ok(base32::encode(BASE32, &bytes))
}

/// Hash a token so raw values never touch the database.
#[must_use]
pub fn hash_token(plaintext: &str) -> TokenHash {
    Sha256::digest(plaintext.as_bytes()).into()
}

/// Shape check done before any lookup: 26 characters of `A-Z2-7`.
#[must_use]
pub fn valid_plaintext(plaintext: &str) -> bool {
    plaintext.len() == TOKEN_PLAINTEXT_LEN
        && plaintext
            .bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b))
}

/// Mints scoped tokens and persists their digests.
#[derive(Clone)]
pub struct TokenIssuer {
    store: Arc<dyn TokenStore>,
}

impl TokenIssuer {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Build a token and its record without persisting it.
    ///
    /// # Errors
    /// Returns an internal error for a non-positive `ttl` or an RNG failure.
    pub fn prepare(
        scope: Scope,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<(IssuedToken, TokenRecord), AuthError> {
        if ttl <= Duration::zero() {
            return Err(anyhow!("token ttl must be positive, got {ttl}").into());
        }
        let expiry = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| anyhow!("token ttl {ttl} puts the expiry out of range"))?;
        let plaintext = generate_plaintext()?;
        let record = TokenRecord {
            hash: hash_token(&plaintext),
            user_id,
            scope,
            expiry,
        };
        Ok((
            IssuedToken {
                plaintext,
                expiry,
                scope,
            },
            record,
        ))
    }

    /// Mint a token for `user_id` and store its digest.
    ///
    /// # Errors
    /// Returns an internal error on RNG or storage failure.
    pub async fn new_token(
        &self,
        scope: Scope,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        // Regenerate on digest collision.
        for _ in 0..INSERT_ATTEMPTS {
            let (token, record) = Self::prepare(scope, user_id, ttl)?;
            if self.store.insert_token(&record).await? {
                return Ok(token);
            }
            warn!(scope = %scope, "token hash collision, regenerating");
        }

        Err(anyhow!("failed to generate unique {scope} token").into())
    }
}
