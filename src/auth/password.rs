//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings, so the salt and the cost parameters travel
//! with the hash and older hashes keep verifying after the cost is raised.

use anyhow::anyhow;
use argon2::{
    password_hash::{self, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};
use base64ct::{Base64, Encoding};
use rand::{rngs::OsRng, RngCore};

use super::error::AuthError;

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasswordCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CredentialVerifier {
    params: Params,
    // Hash of a random secret under the configured cost, compared against when
    // no account matches.
    dummy_hash: String,
}

impl CredentialVerifier {
    /// # Errors
    /// Returns an error when the cost parameters are outside Argon2's limits.
    pub fn new(cost: PasswordCost) -> Result<Self, AuthError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;
        let mut verifier = Self {
            params,
            dummy_hash: String::new(),
        };
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        verifier.dummy_hash = verifier.set_password(&Base64::encode_string(&secret))?;
        Ok(verifier)
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `plaintext` with a fresh salt.
    ///
    /// # Errors
    /// Returns an internal error if hashing fails.
    pub fn set_password(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| anyhow!("failed to hash password: {e}"))?
            .to_string();
        Ok(hash)
    }

    /// Compare `plaintext` against a stored PHC hash.
    ///
    /// A mismatch is `Ok(false)`; only a malformed hash or a hasher failure is an error.
    ///
    /// # Errors
    /// Returns an internal error if the stored hash cannot be parsed or verified.
    pub fn compare_passwords(&self, hash: &str, plaintext: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| anyhow!("invalid stored password hash: {e}"))?;
        match self.hasher().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("failed to verify password: {e}").into()),
        }
    }

    /// Run a full comparison that never matches, so a missing account costs the
    /// same as a wrong password.
    ///
    /// # Errors
    /// Returns an internal error if the hasher fails.
    pub fn compare_dummy(&self, plaintext: &str) -> Result<(), AuthError> {
        self.compare_passwords(&self.dummy_hash, plaintext).map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn test_verifier() -> CredentialVerifier {
    CredentialVerifier::new(PasswordCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}
